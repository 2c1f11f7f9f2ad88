pub mod id;
pub mod error;
pub mod cardinality;
pub mod geometry;
pub mod vocab;
pub mod terms;
pub mod package;
pub mod model;
pub mod workspace;
pub mod update;

// Re-export commonly used types
pub use id::{DiagramId, EntityId, Iri, LinkId, PackageId};
pub use error::CoreError;
pub use cardinality::Cardinality;
pub use geometry::{Point, Size, Vertices};
pub use terms::{AltLabel, RelationshipCatalog, RelationshipType, Term, TermCache};
pub use package::{PackageNode, PackageTree};
pub use model::{Diagram, Entity, EntityView, Link, LinkType, LinkView, Representation, Viewport};
pub use workspace::{LinkLabels, Workspace};
pub use update::{UpdateBatch, UpdateOp};
