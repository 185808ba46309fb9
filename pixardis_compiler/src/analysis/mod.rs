//! Semantic analysis.
//!
//! Two passes over the tree: the first collects every function
//! signature into the global scope so calls may reference functions
//! declared later in the unit; the second resolves names, checks types
//! and control flow, and assigns frame slots. Results land in
//! [`Annotations`], a set of side tables keyed by [`NodeId`].
mod check;
mod scope;

use std::collections::HashMap;

use smol_str::SmolStr;

pub use self::scope::{FunSig, Resolved, ScopeStack, Symbol};
use crate::{
    ast::{NodeId, Program, Type},
    diag::Diagnostics,
};

/// Resolved storage of a variable reference: a slot in the current
/// call frame, or a slot in the entry (global) frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarSite {
    pub slot: usize,
    pub global: bool,
}

/// The annotation side tables produced by analysis and consumed by the
/// code generator.
#[derive(Debug)]
pub struct Annotations {
    /// Expression result types, indexed by node id.
    types: Vec<Option<Type>>,
    /// Variable sites for reads, assignments and declarations.
    sites: Vec<Option<VarSite>>,
    /// Local slot count per function, parameters included.
    pub frames: HashMap<SmolStr, usize>,
    /// Slot count of the entry sequence's frame.
    pub entry_slots: usize,
}

impl Annotations {
    fn new(node_count: u32) -> Self {
        Self {
            types: vec![None; node_count as usize],
            sites: vec![None; node_count as usize],
            frames: HashMap::new(),
            entry_slots: 0,
        }
    }

    fn set_type(&mut self, id: NodeId, ty: Type) {
        self.types[id as usize] = Some(ty);
    }

    fn set_site(&mut self, id: NodeId, site: VarSite) {
        self.sites[id as usize] = Some(site);
    }

    /// Type of an expression node. Analysis guarantees every node that
    /// survives an error-free compile is typed; anything else is a
    /// compiler bug.
    pub fn ty(&self, id: NodeId) -> Type {
        self.types[id as usize].expect("expression node without a type")
    }

    pub fn site(&self, id: NodeId) -> VarSite {
        self.sites[id as usize].expect("variable reference without a resolved site")
    }
}

/// Run both analysis passes. The annotations are only meaningful when
/// the sink stayed empty.
pub fn analyse(program: &Program, node_count: u32, diag: &mut Diagnostics) -> Annotations {
    let mut analyzer = check::Analyzer::new(node_count, diag);
    analyzer.run(program);
    analyzer.into_annotations()
}
