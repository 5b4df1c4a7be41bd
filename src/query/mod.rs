//! Listing support: filter translation, cursor pagination and ordering checks

mod filter;
mod page;
mod pairs;

pub use filter::{
    parse_filter, translate, translate_filter, Condition, Connective, FieldKind, FieldSpec,
    FilterError, FilterExpr, FilterFragment, FilterValue, Operator, ANNOTATION_FIELDS,
};
pub use page::{Cursor, Page, PageRequest};
pub use pairs::{is_strictly_descending_by, pairwise, Pairwise};
