//! Essay summary tables: per-scenario statistics, adoption profiles,
//! the transfer response curve and adoption modality

pub mod modality;
pub mod profile;
pub mod response;
pub mod scenario;

pub use modality::{ModalityContrast, ModalityContrastRow, ModalityReport};
pub use profile::{ScenarioProfile, SectorShare};
pub use response::{ResponseCurve, ResponsePoint};
pub use scenario::{NamedSummary, ScenarioOverview};
