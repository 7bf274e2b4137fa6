pub use flapper_core::{DecisionFunction, SilhouetteProvider};
pub mod brain {
    pub use flapper_core::brain::*;
}
pub mod config {
    pub use flapper_core::config::*;
}
pub mod collision {
    pub use flapper_core::collision::*;
}
pub mod generation {
    pub use flapper_core::generation::*;
}
pub mod mask {
    pub use flapper_core::mask::*;
}
pub mod metrics {
    pub use flapper_core::metrics::*;
}
pub mod obstacles {
    pub use flapper_core::obstacles::*;
}
pub mod physics {
    pub use flapper_core::physics::*;
}
pub mod population {
    pub use flapper_core::population::*;
}
pub mod history {
    pub use flapper_io::history::*;
}

pub mod state {
    pub use flapper_data::*;
}
