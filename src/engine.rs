// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! The propagation engine (`spec.md` §4.4): a FIFO worklist of deferred event-record callbacks,
//! and the `dispatch` function that turns `(Handler, Event)` pairs into the structural-growth
//! calls that realize `spec.md` §4.2's propagation rules.
//!
//! Everything that mutates a [`Node`][crate::graph::Node] enqueues rather than invokes directly
//! (`spec.md` §4.4): this defers all handler firing out of the mutation that caused it, so a
//! handler never observes a half-grown node, and so that cyclic propagation (member mirroring
//! between two connected nodes) terminates — every `(node, fact)` pair is added at most once,
//! which bounds how many times any handler can fire.

use std::collections::VecDeque;

use crate::arena::Handle;
use crate::error::CancellationError;
use crate::error::CancellationFlag;
use crate::graph::FlowGraph;
use crate::graph::Handler;
use crate::graph::Node;
use crate::interner::InternedString;

/// One of the five facts a [`Node`] can announce to its subscribed handlers (`spec.md` §4.1's
/// "handler interface").
#[derive(Clone, Copy, Debug)]
pub enum Event {
    FunctionAdded(Handle<Node>),
    ParameterAdded(usize, Handle<Node>),
    ReturnValueAdded(Handle<Node>),
    DynamicMemberAdded(Handle<Node>),
    MemberAdded(Handle<InternedString>, Handle<Node>),
}

/// Who a deferred [`WorkItem`] is destined for: either every handler currently subscribed to a
/// node (a broadcast, enqueued by a structural accessor at the moment a fact is created), or one
/// specific handler (a direct notification, enqueued either by expanding a broadcast or by
/// `add_handler`'s retro-notification of a newly subscribed handler).
#[derive(Clone, Copy, Debug)]
pub enum Subscriber {
    Broadcast(Handle<Node>),
    Direct(Handler),
}

/// A single deferred callback: "tell `subscriber` that `event` happened."
#[derive(Clone, Copy, Debug)]
pub struct WorkItem {
    subscriber: Subscriber,
    event: Event,
}

/// Saturation-phase counters, returned by [`FlowGraph::apply`][crate::graph::FlowGraph::apply] so
/// a caller can monitor analysis cost without instrumenting the engine itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stats {
    pub nodes: usize,
    pub edges: usize,
    pub handlers: usize,
    pub work_items_enqueued: usize,
    pub work_items_processed: usize,
}

/// The FIFO queue of deferred callbacks. Owned by the caller of [`FlowGraph::apply`] for the
/// duration of one `seed` + `drain` run; nothing outside `graph`/`engine`/`walker` needs to touch
/// it directly.
#[derive(Default)]
pub struct Worklist {
    items: VecDeque<WorkItem>,
    enqueued: usize,
    processed: usize,
}

impl Worklist {
    pub fn new() -> Worklist {
        Worklist::default()
    }

    pub(crate) fn push_broadcast(&mut self, node: Handle<Node>, event: Event) {
        self.items.push_back(WorkItem {
            subscriber: Subscriber::Broadcast(node),
            event,
        });
        self.enqueued += 1;
    }

    pub(crate) fn push_direct(&mut self, handler: Handler, event: Event) {
        self.items.push_back(WorkItem {
            subscriber: Subscriber::Direct(handler),
            event,
        });
        self.enqueued += 1;
    }

    pub fn enqueued(&self) -> usize {
        self.enqueued
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Drains the queue to quiescence, checking `cancellation` between work items (`spec.md` §5:
    /// ordering is strict FIFO; a callback may enqueue further callbacks, which this loop simply
    /// keeps popping until none remain).
    pub fn drain(&mut self, graph: &mut FlowGraph, cancellation: &dyn CancellationFlag) -> Result<(), CancellationError> {
        while let Some(item) = self.items.pop_front() {
            cancellation.check("engine::drain")?;
            self.processed += 1;
            match item.subscriber {
                Subscriber::Broadcast(node) => {
                    for handler in graph.handlers_of(node) {
                        self.items.push_back(WorkItem {
                            subscriber: Subscriber::Direct(*handler),
                            event: item.event,
                        });
                        self.enqueued += 1;
                    }
                }
                Subscriber::Direct(handler) => {
                    copious_debugging!("dispatch {:?} {:?}", handler, item.event);
                    dispatch(graph, self, handler, item.event);
                }
            }
        }
        Ok(())
    }
}

/// Turns one `(Handler, Event)` pair into the structural-growth calls that realize `spec.md`
/// §4.2's propagation rules. `A.connect_to(B)` installs `Handler::Forward(B)` on `A` and
/// `Handler::Reverse(A)` on `B`; `A.get_dynamic_member()` installs `Handler::DynamicAlias(d)` on
/// `A` itself, where `d` is `A`'s own dynamic-member node.
fn dispatch(graph: &mut FlowGraph, worklist: &mut Worklist, handler: Handler, event: Event) {
    match handler {
        Handler::Forward(sink) => match event {
            Event::FunctionAdded(f) => {
                graph.add_function(worklist, sink, f);
            }
            Event::ParameterAdded(index, a) => {
                let sink_param = graph.get_parameter(worklist, sink, index);
                graph.connect_to(worklist, a, sink_param);
            }
            Event::ReturnValueAdded(a_rv) => {
                let sink_rv = graph.get_return_value(worklist, sink);
                graph.connect_to(worklist, sink_rv, a_rv);
            }
            Event::DynamicMemberAdded(d) => {
                let sink_dyn = graph.get_dynamic_member(worklist, sink);
                graph.connect_to(worklist, d, sink_dyn);
                graph.connect_to(worklist, sink_dyn, d);
            }
            Event::MemberAdded(name, v) => {
                let name = graph.member_name(name).to_string();
                let sink_member = graph.get_member(worklist, sink, &name);
                graph.connect_to(worklist, v, sink_member);
                graph.connect_to(worklist, sink_member, v);
            }
        },
        Handler::Reverse(source) => match event {
            Event::FunctionAdded(_) | Event::ParameterAdded(_, _) => {
                // Functions flow forward only, and parameters follow the same forward-only
                // convention (spec.md §4.2): the reverse handler has no reaction to either.
            }
            Event::ReturnValueAdded(sink_rv) => {
                let source_rv = graph.get_return_value(worklist, source);
                graph.connect_to(worklist, sink_rv, source_rv);
            }
            Event::DynamicMemberAdded(d) => {
                let source_dyn = graph.get_dynamic_member(worklist, source);
                graph.connect_to(worklist, d, source_dyn);
                graph.connect_to(worklist, source_dyn, d);
            }
            Event::MemberAdded(name, v) => {
                let name = graph.member_name(name).to_string();
                let source_member = graph.get_member(worklist, source, &name);
                graph.connect_to(worklist, v, source_member);
                graph.connect_to(worklist, source_member, v);
            }
        },
        Handler::DynamicAlias(dynamic) => {
            if let Event::MemberAdded(_, v) = event {
                graph.connect_to(worklist, v, dynamic);
                graph.connect_to(worklist, dynamic, v);
            }
        }
    }
}
