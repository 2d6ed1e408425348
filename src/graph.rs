// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! The node graph and event bus (`spec.md` §4.1).
//!
//! A [`FlowGraph`] owns every [`Node`] created while seeding and saturating an analysis. Nodes
//! never reference each other directly — they're arena-allocated (see [`crate::arena`]) and refer
//! to one another by [`Handle<Node>`], so the densely cyclic structure that bidirectional member
//! mirroring produces doesn't require reference counting or unsafe self-reference.
//!
//! Every structural accessor (`get_member`, `get_parameter`, ...) is idempotent: asking for a
//! member/parameter/dynamic-member/return-value that already exists returns the existing node;
//! otherwise it is created and the creation is announced once, via the
//! [`Worklist`][crate::engine::Worklist], to every handler currently subscribed to the node
//! (`spec.md` §3's "Invariants").

use fxhash::FxHashSet;
use indexmap::IndexMap;

use crate::arena::Arena;
use crate::arena::Handle;
use crate::arena::HandleSet;
use crate::ast;
use crate::ast::Name;
use crate::engine::Event;
use crate::engine::Stats;
use crate::engine::Worklist;
use crate::error::CancellationError;
use crate::error::CancellationFlag;
use crate::interner::InternedString;
use crate::interner::Interner;
use crate::walker;

/// What syntactic construct caused a node to be created. Diagnostic only — `spec.md` §3 calls
/// the AST back-reference "diagnostic only," and a raw pointer into the (owned, recursively
/// dropped) AST tree would need unsafe code or reference counting for no behavioral benefit, so
/// this just tags the construct kind plus whatever `Name` was involved.
#[derive(Clone, Copy, Debug)]
pub enum Origin {
    /// The node created for a function literal, optionally carrying its declared name.
    Function(Option<Name>),
    /// The node created for an object literal.
    Object,
    /// The node created for a `var` declaration.
    Variable(Name),
    /// A structural child: a member, a parameter, a return value, or a dynamic member. These
    /// don't have their own syntactic origin — they're created lazily by a structural accessor.
    Structural,
    /// The single process-wide dynamic sink.
    Dynamic,
}

/// A subscriber installed on a node by `connect-to` or `get-dynamic-member` (`spec.md` §4.1,
/// §4.2). Each variant just carries the handle of the *other* node the propagation rule needs;
/// dispatch logic (in [`crate::engine`]) is a pure function of `(Handler, Event)`.
#[derive(Clone, Copy, Debug)]
pub enum Handler {
    /// Installed on the source `A` of an edge `A -> B`. Mirrors `A`'s growth onto `B`: forwards
    /// functions, forwards parameters, reverse-connects return values, and bidirectionally
    /// aliases members (`spec.md` §4.2, "Handler on A").
    Forward(Handle<Node>),
    /// Installed on the sink `B` of an edge `A -> B`. The complementary half of the contract:
    /// return values and members created on `B` are also connected back into `A` (`spec.md`
    /// §4.2, "Handler on B"). Functions and parameters are forward-only, so this variant ignores
    /// those events.
    Reverse(Handle<Node>),
    /// Installed on a node `N` by `get-dynamic-member()`. Whenever a named member is added to
    /// `N` (whether it already existed when the dynamic member was created, or is added later —
    /// see `SPEC_FULL.md` §4.2 for why both must be covered), bidirectionally aliases it with
    /// `N`'s dynamic member.
    DynamicAlias(Handle<Node>),
}

/// A single node in the flow graph: an abstract value that facts accumulate on.
pub struct Node {
    origin: Origin,
    functions: HandleSet<Node>,
    members: IndexMap<Handle<InternedString>, Handle<Node>>,
    dynamic_member: Option<Handle<Node>>,
    parameters: Vec<Option<Handle<Node>>>,
    return_value: Option<Handle<Node>>,
    successors: FxHashSet<Handle<Node>>,
    handlers: Vec<Handler>,
}

impl Node {
    fn new(origin: Origin) -> Node {
        Node {
            origin,
            functions: HandleSet::new(),
            members: IndexMap::new(),
            dynamic_member: None,
            parameters: Vec::new(),
            return_value: None,
            successors: FxHashSet::default(),
            handlers: Vec::new(),
        }
    }
}

/// Owns the arena of [`Node`]s, the `Name -> Node` binding map, and the member-name interner for
/// one analysis run.
pub struct FlowGraph {
    nodes: Arena<Node>,
    bindings: std::collections::HashMap<Name, Handle<Node>>,
    interner: Interner,
    dynamic_node: Handle<Node>,
}

impl Default for FlowGraph {
    fn default() -> FlowGraph {
        FlowGraph::new()
    }
}

impl FlowGraph {
    pub fn new() -> FlowGraph {
        let mut nodes = Arena::new();
        let dynamic_node = nodes.add(Node::new(Origin::Dynamic));
        FlowGraph {
            nodes,
            bindings: std::collections::HashMap::new(),
            interner: Interner::new(),
            dynamic_node,
        }
    }

    /// The single, process-wide "unknown" sink used for unresolved name references
    /// (`spec.md` §3).
    pub fn dynamic_node(&self) -> Handle<Node> {
        self.dynamic_node
    }

    pub fn node_for_name(&self, name: Name) -> Option<Handle<Node>> {
        self.bindings.get(&name).copied()
    }

    pub fn bound_names(&self) -> impl Iterator<Item = (Name, Handle<Node>)> + '_ {
        self.bindings.iter().map(|(n, h)| (*n, *h))
    }

    pub fn origin(&self, node: Handle<Node>) -> Origin {
        self.nodes[node].origin
    }

    /// Creates the node for a function literal, binding it to `name` if it has one. The
    /// returned handle doubles as the function's abstract identity: `spec.md` §4.3's "add `F` to
    /// `n`'s function set" is realized by passing this same handle to [`FlowGraph::add_function`].
    pub fn create_function_node(&mut self, name: Option<Name>) -> Handle<Node> {
        let handle = self.nodes.add(Node::new(Origin::Function(name)));
        if let Some(name) = name {
            self.bindings.insert(name, handle);
        }
        handle
    }

    pub fn create_object_node(&mut self) -> Handle<Node> {
        self.nodes.add(Node::new(Origin::Object))
    }

    pub fn create_variable_node(&mut self, name: Name) -> Handle<Node> {
        let handle = self.nodes.add(Node::new(Origin::Variable(name)));
        self.bindings.insert(name, handle);
        handle
    }

    pub fn intern_member_name(&mut self, name: &str) -> Handle<InternedString> {
        self.interner.intern(name)
    }

    pub fn member_name(&self, handle: Handle<InternedString>) -> &str {
        self.interner.resolve(handle)
    }

    pub fn functions(&self, node: Handle<Node>) -> impl Iterator<Item = Handle<Node>> + '_ {
        self.nodes[node].functions.iter()
    }

    pub fn function_count(&self, node: Handle<Node>) -> usize {
        self.nodes[node].functions.len()
    }

    pub fn has_function(&self, node: Handle<Node>, f: Handle<Node>) -> bool {
        self.nodes[node].functions.contains(f)
    }

    pub fn members(&self, node: Handle<Node>) -> impl Iterator<Item = (Handle<InternedString>, Handle<Node>)> + '_ {
        self.nodes[node].members.iter().map(|(k, v)| (*k, *v))
    }

    pub fn member(&self, node: Handle<Node>, name: &str) -> Option<Handle<Node>> {
        let key = self.interner.peek(name)?;
        self.nodes[node].members.get(&key).copied()
    }

    pub fn dynamic_member(&self, node: Handle<Node>) -> Option<Handle<Node>> {
        self.nodes[node].dynamic_member
    }

    pub fn parameter(&self, node: Handle<Node>, index: usize) -> Option<Handle<Node>> {
        self.nodes[node].parameters.get(index).copied().flatten()
    }

    pub fn parameter_count(&self, node: Handle<Node>) -> usize {
        self.nodes[node].parameters.len()
    }

    pub fn return_value(&self, node: Handle<Node>) -> Option<Handle<Node>> {
        self.nodes[node].return_value
    }

    pub fn successors(&self, node: Handle<Node>) -> impl Iterator<Item = Handle<Node>> + '_ {
        self.nodes[node].successors.iter().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// `add-function(F)`: adds `f` to `node`'s function set. If `f` wasn't already present,
    /// enqueues a broadcast callback that will notify every handler currently subscribed to
    /// `node` with `functionAdded(f)` once the worklist drains it (`spec.md` §4.1).
    pub fn add_function(&mut self, worklist: &mut Worklist, node: Handle<Node>, f: Handle<Node>) {
        if self.nodes[node].functions.add(f) {
            copious_debugging!("add-function {:?} -> {:?}", f, node);
            worklist.push_broadcast(node, Event::FunctionAdded(f));
        }
    }

    /// `get-member(name)`: returns the child node for `name` under `node`, creating it (and
    /// broadcasting `memberAdded`) on first request.
    pub fn get_member(&mut self, worklist: &mut Worklist, node: Handle<Node>, name: &str) -> Handle<Node> {
        let key = self.interner.intern(name);
        if let Some(existing) = self.nodes[node].members.get(&key) {
            return *existing;
        }
        let child = self.nodes.add(Node::new(Origin::Structural));
        self.nodes[node].members.insert(key, child);
        copious_debugging!("get-member {:?}.{} -> {:?}", node, name, child);
        worklist.push_broadcast(node, Event::MemberAdded(key, child));
        child
    }

    /// `get-dynamic-member()`: returns `node`'s dynamic-member child, creating it on first
    /// request. Creation both broadcasts `dynamicMemberAdded` and installs the internal
    /// `DynamicAlias` handler described in `spec.md` §4.1(b) — see [`SPEC_FULL.md`] §4.2 for why
    /// that handler is installed through the same retro-notifying `add_handler` path as
    /// `connect_to`'s handlers, rather than reacting only to members added afterward.
    pub fn get_dynamic_member(&mut self, worklist: &mut Worklist, node: Handle<Node>) -> Handle<Node> {
        if let Some(existing) = self.nodes[node].dynamic_member {
            return existing;
        }
        let child = self.nodes.add(Node::new(Origin::Structural));
        self.nodes[node].dynamic_member = Some(child);
        copious_debugging!("get-dynamic-member {:?} -> {:?}", node, child);
        worklist.push_broadcast(node, Event::DynamicMemberAdded(child));
        self.add_handler(worklist, node, Handler::DynamicAlias(child));
        child
    }

    /// `get-parameter(i)`: returns the parameter node at index `i`, padding absent entries with
    /// `None` on first request past the current length.
    pub fn get_parameter(&mut self, worklist: &mut Worklist, node: Handle<Node>, index: usize) -> Handle<Node> {
        if let Some(Some(existing)) = self.nodes[node].parameters.get(index) {
            return *existing;
        }
        if self.nodes[node].parameters.len() <= index {
            self.nodes[node].parameters.resize(index + 1, None);
        }
        let child = self.nodes.add(Node::new(Origin::Structural));
        self.nodes[node].parameters[index] = Some(child);
        copious_debugging!("get-parameter {:?}[{}] -> {:?}", node, index, child);
        worklist.push_broadcast(node, Event::ParameterAdded(index, child));
        child
    }

    /// `get-return-value()`: returns `node`'s return-value child, creating it on first request.
    pub fn get_return_value(&mut self, worklist: &mut Worklist, node: Handle<Node>) -> Handle<Node> {
        if let Some(existing) = self.nodes[node].return_value {
            return existing;
        }
        let child = self.nodes.add(Node::new(Origin::Structural));
        self.nodes[node].return_value = Some(child);
        copious_debugging!("get-return-value {:?} -> {:?}", node, child);
        worklist.push_broadcast(node, Event::ReturnValueAdded(child));
        child
    }

    /// `connect-to(other)`: adds the directed edge `source -> sink`. A no-op if the edge already
    /// exists (`spec.md` §3's "Invariants": "adding an edge A→B where it already exists is a
    /// no-op"), which is what keeps saturation finite despite every propagation rule being able
    /// to re-derive an edge it already installed. On success, installs the `Forward`/`Reverse`
    /// handler pair that realizes the propagation contract in `spec.md` §4.2.
    pub fn connect_to(&mut self, worklist: &mut Worklist, source: Handle<Node>, sink: Handle<Node>) {
        if !self.nodes[source].successors.insert(sink) {
            return;
        }
        copious_debugging!("connect-to {:?} -> {:?}", source, sink);
        self.add_handler(worklist, source, Handler::Forward(sink));
        self.add_handler(worklist, sink, Handler::Reverse(source));
    }

    /// `add-handler(h)`: subscribes `handler` to `node`, then retro-notifies it — and *only*
    /// it, not `node`'s other handlers — of every fact `node` already carries, in creation
    /// order, so that installing an edge late still observes everything that happened before it
    /// was installed (`spec.md` §4.1, §9's "Retro-notification ordering").
    fn add_handler(&mut self, worklist: &mut Worklist, node: Handle<Node>, handler: Handler) {
        self.nodes[node].handlers.push(handler);
        let n = &self.nodes[node];
        for f in n.functions.iter() {
            worklist.push_direct(handler, Event::FunctionAdded(f));
        }
        for (key, value) in n.members.iter() {
            worklist.push_direct(handler, Event::MemberAdded(*key, *value));
        }
        if let Some(d) = n.dynamic_member {
            worklist.push_direct(handler, Event::DynamicMemberAdded(d));
        }
        for (index, parameter) in n.parameters.iter().enumerate() {
            if let Some(p) = parameter {
                worklist.push_direct(handler, Event::ParameterAdded(index, *p));
            }
        }
        if let Some(rv) = n.return_value {
            worklist.push_direct(handler, Event::ReturnValueAdded(rv));
        }
    }

    pub(crate) fn handlers_of(&self, node: Handle<Node>) -> &[Handler] {
        &self.nodes[node].handlers
    }

    pub fn total_edges(&self) -> usize {
        self.nodes.iter_handles().map(|h| self.nodes[h].successors.len()).sum()
    }

    pub fn total_handlers(&self) -> usize {
        self.nodes.iter_handles().map(|h| self.nodes[h].handlers.len()).sum()
    }

    /// Seeds this graph from `root` and drains the resulting worklist to quiescence — the single
    /// entry point tying the walker and the propagation engine together (`spec.md` §2: "the
    /// walker primes the graph, then the engine runs the worklist to fixed point").
    pub fn apply(&mut self, root: &ast::Ast, cancellation: &dyn CancellationFlag) -> Result<Stats, CancellationError> {
        let mut worklist = Worklist::new();
        walker::seed(self, &mut worklist, root);
        worklist.drain(self, cancellation)?;
        Ok(Stats {
            nodes: self.node_count(),
            edges: self.total_edges(),
            handlers: self.total_handlers(),
            work_items_enqueued: worklist.enqueued(),
            work_items_processed: worklist.processed(),
        })
    }

    /// Renders a saturated graph's `Name`-indexed facts into a serializable summary: for each
    /// bound name, its reachable member names and whether it has a dynamic member. Functions are
    /// reported by a stable, opaque index into [`AnalysisSummary::functions`] rather than a raw
    /// arena handle (`SPEC_FULL.md` §4.8) — that legend resolves each index back to the function
    /// literal's declared name (via its [`Origin`]), or `<anonymous>` for a function expression
    /// with none, so a caller can actually identify which function an index stands for.
    #[cfg(feature = "serde")]
    pub fn summarize(&self, bindings: &ast::Bindings) -> AnalysisSummary {
        use itertools::Itertools;

        let mut function_index = std::collections::HashMap::new();
        let mut functions = Vec::new();
        for handle in self.nodes.iter_handles() {
            if let Origin::Function(name) = self.origin(handle) {
                function_index.insert(handle, functions.len());
                functions.push(match name {
                    Some(name) => bindings.spelling(name).to_string(),
                    None => "<anonymous>".to_string(),
                });
            }
        }

        let names = self
            .bindings
            .iter()
            .map(|(n, h)| (*n, *h))
            .sorted_by_key(|(name, _)| bindings.spelling(*name).to_string())
            .map(|(name, node)| {
                let functions: Vec<usize> = self.nodes[node]
                    .functions
                    .iter()
                    .filter_map(|f| function_index.get(&f).copied())
                    .sorted_unstable()
                    .collect();
                let members: Vec<String> = self.nodes[node]
                    .members
                    .keys()
                    .map(|key| self.interner.resolve(*key).to_string())
                    .sorted()
                    .collect();
                NameSummary {
                    name: bindings.spelling(name).to_string(),
                    functions,
                    members,
                    has_dynamic_member: self.nodes[node].dynamic_member.is_some(),
                }
            })
            .collect();

        AnalysisSummary { functions, names }
    }
}

/// Serializable summary of a saturated [`FlowGraph`], keyed by declared name spelling rather
/// than the internal `Name`/`Handle<Node>` identities (`SPEC_FULL.md` §4.8).
#[cfg(feature = "serde")]
#[derive(serde::Serialize)]
pub struct AnalysisSummary {
    /// The legend `NameSummary::functions` indices refer into: `functions[i]` is the declared
    /// name (or `<anonymous>`) of the `i`th distinct function literal reachable from any bound
    /// name in this analysis.
    pub functions: Vec<String>,
    pub names: Vec<NameSummary>,
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize)]
pub struct NameSummary {
    pub name: String,
    /// Stable indices into [`AnalysisSummary::functions`] — not arena handles, which are an
    /// implementation detail that shouldn't leak into a serialized artifact.
    pub functions: Vec<usize>,
    pub members: Vec<String>,
    pub has_dynamic_member: bool,
}
