//! The seam between block structure and the inline grammar. Inline parsing
//! (emphasis, links, code spans, entities, autolinks) is out of scope for
//! this crate; `finalize_document` calls a collaborator through this trait
//! exactly once, handing over the finished tree and reference map.

use crate::nodes::AstNode;
use crate::parser::Options;
use crate::refmap::RefMap;

pub trait InlineCollaborator {
    fn process<'a>(&mut self, root: &'a AstNode<'a>, refmap: &RefMap, options: &Options);
}

/// The default collaborator: does nothing. A real renderer wires in its
/// own inline parser here; this crate only needs to prove the seam exists
/// and is invoked at the right point in `finalize_document`.
#[derive(Debug, Default)]
pub struct NullInlineCollaborator;

impl InlineCollaborator for NullInlineCollaborator {
    fn process<'a>(&mut self, _root: &'a AstNode<'a>, _refmap: &RefMap, _options: &Options) {}
}
