//! Resolved reference graphs.
//!
//! A [`Joined`] is the transient output of a join: the root instance plus,
//! for each reference or embedded field, the hydrated sub-instances standing
//! in for the stored identifiers and inline sub-documents. The graph is a
//! view for in-memory use — it is never persisted directly. Edits made to its
//! sub-instances flow back to storage through
//! [`Collection::save_refs`](crate::collection::Collection::save_refs),
//! which walks the graph back down to identifiers and inline bodies.

use crate::instance::Instance;

/// The hydrated value of one reference or embedded field.
#[derive(Debug, Clone)]
pub enum Resolved {
    /// A single-valued field's target.
    One(Instance),
    /// A list-valued field's targets, in stored order.
    Many(Vec<Instance>),
}

impl Resolved {
    /// The single resolved target, if this field is single-valued.
    pub fn one(&self) -> Option<&Instance> {
        match self {
            Resolved::One(instance) => Some(instance),
            Resolved::Many(_) => None,
        }
    }

    /// Mutable access to the single resolved target.
    pub fn one_mut(&mut self) -> Option<&mut Instance> {
        match self {
            Resolved::One(instance) => Some(instance),
            Resolved::Many(_) => None,
        }
    }

    /// The resolved targets, if this field is list-valued.
    pub fn many(&self) -> Option<&[Instance]> {
        match self {
            Resolved::Many(instances) => Some(instances),
            Resolved::One(_) => None,
        }
    }

    /// Mutable access to the resolved target list.
    pub fn many_mut(&mut self) -> Option<&mut Vec<Instance>> {
        match self {
            Resolved::Many(instances) => Some(instances),
            Resolved::One(_) => None,
        }
    }

    /// Iterates the resolved targets regardless of cardinality.
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        match self {
            Resolved::One(instance) => std::slice::from_ref(instance).iter(),
            Resolved::Many(instances) => instances.iter(),
        }
    }

    pub(crate) fn instances_mut(&mut self) -> impl Iterator<Item = &mut Instance> {
        match self {
            Resolved::One(instance) => std::slice::from_mut(instance).iter_mut(),
            Resolved::Many(instances) => instances.iter_mut(),
        }
    }
}

/// A root instance with its reference and embedded fields resolved one level
/// deep.
#[derive(Debug, Clone)]
pub struct Joined {
    root: Instance,
    resolved: Vec<(String, Resolved)>,
}

impl Joined {
    pub(crate) fn new(root: Instance, resolved: Vec<(String, Resolved)>) -> Self {
        Self { root, resolved }
    }

    /// The root instance the join started from.
    pub fn instance(&self) -> &Instance {
        &self.root
    }

    /// Mutable access to the root instance.
    pub fn instance_mut(&mut self) -> &mut Instance {
        &mut self.root
    }

    /// The resolved value of one field.
    pub fn resolved(&self, field: &str) -> Option<&Resolved> {
        self.resolved
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, resolved)| resolved)
    }

    /// Mutable access to the resolved value of one field.
    pub fn resolved_mut(&mut self, field: &str) -> Option<&mut Resolved> {
        self.resolved
            .iter_mut()
            .find(|(name, _)| name == field)
            .map(|(_, resolved)| resolved)
    }

    /// Iterates every resolved field in schema declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Resolved)> {
        self.resolved
            .iter()
            .map(|(name, resolved)| (name.as_str(), resolved))
    }

    /// Splits the graph into its root and resolved halves for simultaneous
    /// mutation.
    pub(crate) fn parts_mut(&mut self) -> (&mut Instance, &mut Vec<(String, Resolved)>) {
        (&mut self.root, &mut self.resolved)
    }
}
