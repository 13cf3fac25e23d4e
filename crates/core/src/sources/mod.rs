//! Wind sources, obstacles and the aggregator that snapshots them per tick

pub mod aggregator;
pub mod global;
pub mod local;
pub mod obstacle;

pub use aggregator::{GlobalWindId, LocalWindId, ObstacleId, SourceAggregator, SourceSnapshot};
pub use global::{GlobalWindEmitter, GlobalWindKind, GlobalWindSource};
pub use local::{LocalWindEmitter, LocalWindKind, LocalWindSource};
pub use obstacle::{Obstacle, SphereObstacle};
