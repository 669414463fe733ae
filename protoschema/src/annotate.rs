//! Field metadata annotation.
//!
//! Comments carry the indexing metadata read by the downstream storage
//! layer. The builder asks [`field_comment`] for the final comment of each
//! field; nothing here touches the schema tree.

use crate::descriptor::TypeMarkers;
use crate::extract::PropertyInfo;

/// Message comment marking a message as indexed.
pub const INDEXED_MESSAGE_COMMENT: &str = "@Indexed";

/// Default field comment of generated model protos.
pub const INDEX_COMMENT: &str = "@Field(index = Index.NO, store = Store.YES) @SortableField";

/// Final comment of a field.
///
/// In priority order: the identity field of a generated model root gets the
/// indexed variant of `base`; a tagged field gets `base` followed by its
/// tags; every other field keeps `base`.
pub fn field_comment(property: &PropertyInfo, owner: &TypeMarkers, base: Option<&str>) -> Option<String> {
    if property.identity && owner.model_root {
        return base.map(indexed_variant);
    }

    if let Some(tags) = &property.tags {
        let tag_line = format!("@VariableInfo(tags=\"{tags}\")");
        return Some(match base {
            Some(base) => format!("{base}\n {tag_line}"),
            None => tag_line,
        });
    }

    base.map(str::to_string)
}

/// Switch a field comment from not indexed to indexed.
pub fn indexed_variant(comment: &str) -> String {
    comment.replace("Index.NO", "Index.YES")
}
