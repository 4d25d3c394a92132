pub mod gateway;
pub mod orchestrator;
pub mod prober;

pub use gateway::{CommandGateway, GatewayCommand};
pub use orchestrator::ScanOrchestrator;
pub use prober::{OllamaProber, Probe};
