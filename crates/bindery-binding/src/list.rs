#![forbid(unsafe_code)]

//! Loop reconciliation.
//!
//! A loop element carries `var=arrayPath`. The first time the element is
//! seen, its children are captured as the template and removed. Each pass
//! then keeps exactly `len(array) * template_width` children:
//!
//! - **Growth** appends one instance per new index. The instance is the
//!   template with `var` replaced (as a whole identifier) in every
//!   declarative attribute.
//! - **Shrink** truncates from the end.
//! - **Same length** leaves the children alone.
//!
//! Existing instances are never rebuilt, so DOM-local state (typed text,
//! focus, checkbox state not yet committed) survives growth and shrink.
//!
//! # Invariants
//!
//! 1. After a pass, every reconciled loop element inside the scope has
//!    `len * template_width` children.
//! 2. Elements created by a pass are "fresh": the rest of the same pass
//!    applies them even when it is scoped to an unrelated path.
//! 3. Loops nested inside new instances are reconciled in the same pass.
//!    The pass repeats until no unvisited loop element remains.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `MalformedBindingAttribute` | attribute is not `var=path` | element skipped, logged |
//! | `NotIterable` | source path holds a non-array | element skipped, logged |
//! | `UnparseableExpression` | attribute fails the grammar | element skipped, logged |

use ahash::AHashSet;
use bindery_core::Value;
use bindery_dom::{Document, ElementId, Fragment, Selector};
use bindery_expr::template::substitute;
use bindery_expr::{Expression, ExpressionKind, parse};

use crate::error::BindingError;
use crate::report::ApplyReport;
use crate::session::{Session, is_relevant, malformed, record};

/// Remembered template and instance count of one loop element.
#[derive(Debug, Clone)]
pub(crate) struct LoopState {
    pub(crate) template: Fragment,
    pub(crate) len: usize,
}

/// Parsed loop attribute.
struct LoopSource {
    variable: String,
    path: String,
    len: usize,
}

impl Session {
    fn loop_source(&self, attribute: &str, raw: &str) -> Result<LoopSource, BindingError> {
        let (assignee, assigned) = match parse(raw, &self.state) {
            Expression::Assignment { assignee, assigned } => (assignee, assigned),
            other => return Err(malformed(attribute, raw, ExpressionKind::Assignment, &other)),
        };
        match *assigned {
            Expression::Path {
                path,
                value: Value::Array(items),
            } => Ok(LoopSource {
                variable: assignee,
                path,
                len: items.len(),
            }),
            Expression::Path { path, value } => Err(BindingError::NotIterable {
                path,
                found: value.type_name(),
            }),
            other => Err(malformed(attribute, raw, ExpressionKind::Path, &other)),
        }
    }

    /// Bring every relevant loop element in scope to its array length.
    ///
    /// Returns the elements created by this call, descendants included.
    pub(crate) fn reconcile_loops(
        &self,
        doc: &mut dyn Document,
        changed: Option<&str>,
        report: &mut ApplyReport,
    ) -> AHashSet<ElementId> {
        let attribute = self.options.attributes.repeat.as_str();
        let selector = Selector::has_attribute(attribute);
        let mut fresh = AHashSet::new();
        let mut visited = AHashSet::new();
        let mut loops = self.loops.borrow_mut();

        loop {
            let pending: Vec<ElementId> = doc
                .query_all(self.scope, &selector)
                .into_iter()
                .filter(|el| !visited.contains(el))
                .collect();
            if pending.is_empty() {
                break;
            }
            for el in pending {
                visited.insert(el);
                // An earlier shrink in this round may have detached it.
                if !doc.contains(self.scope, el) {
                    continue;
                }
                let Some(raw) = doc.attribute(el, attribute) else {
                    continue;
                };
                if !is_relevant(&raw, changed, el, &fresh) {
                    report.skipped += 1;
                    continue;
                }
                report.loops += 1;
                let source = match self.loop_source(attribute, &raw) {
                    Ok(source) => source,
                    Err(error) => {
                        record(report, el, attribute, &raw, error);
                        continue;
                    }
                };

                let entry = loops.entry(el).or_insert_with(|| {
                    let template = doc.capture(el);
                    doc.truncate_children(el, 0);
                    LoopState { template, len: 0 }
                });
                if entry.len == source.len {
                    continue;
                }
                let _span = tracing::debug_span!(
                    "reconcile_list",
                    element = %el,
                    path = %source.path,
                    from = entry.len,
                    to = source.len,
                )
                .entered();

                if source.len > entry.len {
                    let names = &self.options.attributes;
                    for index in entry.len..source.len {
                        let replacement = self.options.loop_indexing.replacement(&source.path, index);
                        let instance = entry.template.map_attributes(|name, value| {
                            names
                                .is_declarative(name)
                                .then(|| substitute(value, &source.variable, &replacement))
                        });
                        for created in doc.append_fragment(el, &instance) {
                            fresh.insert(created);
                            fresh.extend(doc.descendants(created));
                        }
                    }
                } else {
                    doc.truncate_children(el, source.len * entry.template.len());
                }
                tracing::debug!(instances = source.len, "list reconciled");
                entry.len = source.len;
            }
        }

        loops.retain(|el, _| doc.contains(self.scope, *el));
        fresh
    }
}
