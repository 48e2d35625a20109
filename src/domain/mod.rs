pub mod account;
pub mod category;
pub mod common;
pub mod operation;
pub mod validation;

pub use account::Account;
pub use category::Category;
pub use common::{
    checked_net, checked_total, Displayable, EntityId, EntityKind, Identifiable, NamedEntity, OperationKind, ParseKindError,
    UNASSIGNED_ID,
};
pub use operation::Operation;
