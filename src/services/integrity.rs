use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{depth_first_search, Control, DfsEvent};
use thiserror::Error;

use crate::models::{Course, CourseId};

/// A defect in the prerequisite graph that makes a run unanswerable
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntegrityFault {
    #[error("prerequisite cycle detected involving course {0}")]
    PrerequisiteCycle(CourseId),
    #[error("course {course} lists unknown prerequisite {missing}")]
    DanglingPrerequisite { course: CourseId, missing: CourseId },
}

/// Validates the part of the prerequisite graph reachable from the given
/// root courses.
///
/// Edges point from a course to each of its prerequisites, so a depth-first
/// walk from the roots covers exactly the prerequisite chains a run could
/// consult. Faults elsewhere in the catalog do not fail the run.
pub fn check_prerequisites(
    courses: &HashMap<CourseId, Course>,
    roots: impl IntoIterator<Item = CourseId>,
) -> Result<(), IntegrityFault> {
    let mut ordered: Vec<&Course> = courses.values().collect();
    ordered.sort_by_key(|course| course.id);

    let mut graph: DiGraph<CourseId, ()> = DiGraph::new();
    let mut nodes: HashMap<CourseId, NodeIndex> = HashMap::new();
    for course in &ordered {
        nodes.insert(course.id, graph.add_node(course.id));
    }

    // A prerequisite id outside the catalog cannot become an edge; remember
    // it so the walk can report the referencing course.
    let mut dangling: HashMap<CourseId, CourseId> = HashMap::new();
    for course in &ordered {
        let from = nodes[&course.id];
        for prereq in &course.prerequisites {
            match nodes.get(prereq) {
                Some(&to) => {
                    graph.add_edge(from, to, ());
                }
                None => {
                    dangling.entry(course.id).or_insert(*prereq);
                }
            }
        }
    }

    let starts: Vec<NodeIndex> = roots
        .into_iter()
        .filter_map(|id| nodes.get(&id).copied())
        .collect();

    let outcome = depth_first_search(&graph, starts, |event| match event {
        DfsEvent::Discover(node, _) => {
            let course_id = graph[node];
            match dangling.get(&course_id) {
                Some(&missing) => Control::Break(IntegrityFault::DanglingPrerequisite {
                    course: course_id,
                    missing,
                }),
                None => Control::Continue,
            }
        }
        DfsEvent::BackEdge(_, node) => {
            Control::Break(IntegrityFault::PrerequisiteCycle(graph[node]))
        }
        _ => Control::Continue,
    });

    match outcome.break_value() {
        Some(fault) => Err(fault),
        None => Ok(()),
    }
}
