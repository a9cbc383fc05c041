//! PetClinic performance samples
//!
//! Main entry point.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging first so startup is visible
    petclinic_app::logging::init();

    petclinic_app::run().await
}
