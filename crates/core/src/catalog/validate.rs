//! Structural checks for remedy definitions and mission playbooks.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use super::Catalog;
use crate::deadline::MAX_DEADLINE_DAYS;
use crate::error::CatalogError;
use crate::mission::{MissionPlaybook, MissionStep};
use crate::remedy::{RemedyDefinition, RemedyStep, StepAction};

pub(super) fn check_unique_ids(catalog: &Catalog, problems: &mut Vec<CatalogError>) {
    let mut seen = HashSet::new();
    for definition in catalog.remedies() {
        if !seen.insert(definition.id.as_str()) {
            problems.push(CatalogError::DuplicateDefinition {
                definition_id: definition.id.clone(),
            });
        }
    }
    let mut seen = HashSet::new();
    for playbook in catalog.playbooks() {
        if !seen.insert(playbook.id.as_str()) {
            problems.push(CatalogError::DuplicatePlaybook {
                playbook_id: playbook.id.clone(),
            });
        }
    }
}

fn step_neighbors(step: &RemedyStep) -> impl Iterator<Item = &str> {
    std::iter::once(&step.next_step.on_success)
        .chain(step.next_step.on_failure.as_ref())
        .filter_map(|t| t.step_id())
}

pub(super) fn check_definition(definition: &RemedyDefinition, problems: &mut Vec<CatalogError>) {
    let Some(first) = definition.first_step() else {
        problems.push(CatalogError::EmptyDefinition {
            definition_id: definition.id.clone(),
        });
        return;
    };

    let mut declared: HashSet<&str> = HashSet::new();
    for step in &definition.steps {
        if !declared.insert(step.id.as_str()) {
            problems.push(CatalogError::DuplicateStep {
                definition_id: definition.id.clone(),
                step_id: step.id.clone(),
            });
        }
    }

    for step in &definition.steps {
        if let StepAction::AwaitResponse { deadline } = &step.action {
            if deadline.count > MAX_DEADLINE_DAYS {
                problems.push(CatalogError::DeadlineOutOfRange {
                    definition_id: definition.id.clone(),
                    step_id: step.id.clone(),
                    count: deadline.count,
                    max: MAX_DEADLINE_DAYS,
                });
            }
        }
    }

    let mut dangling = false;
    for step in &definition.steps {
        for target in step_neighbors(step) {
            if !declared.contains(target) {
                dangling = true;
                problems.push(CatalogError::DanglingStepRef {
                    definition_id: definition.id.clone(),
                    step_id: step.id.clone(),
                    target: target.to_string(),
                });
            }
        }
    }
    // Reachability and cycle checks assume a closed graph.
    if dangling {
        return;
    }

    let adj: HashMap<&str, Vec<&str>> = definition
        .steps
        .iter()
        .map(|s| (s.id.as_str(), step_neighbors(s).collect()))
        .collect();

    let mut reached: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::from([first.id.as_str()]);
    while let Some(node) = queue.pop_front() {
        if !reached.insert(node) {
            continue;
        }
        for &next in adj.get(node).into_iter().flatten() {
            queue.push_back(next);
        }
    }
    for step in &definition.steps {
        if !reached.contains(step.id.as_str()) {
            problems.push(CatalogError::UnreachableStep {
                definition_id: definition.id.clone(),
                step_id: step.id.clone(),
            });
        }
    }

    detect_step_cycle(definition, &adj, problems);
}

/// Kahn's algorithm over the `next_step` graph; whatever cannot be peeled
/// off in topological order sits on (or behind) a cycle.
fn detect_step_cycle(
    definition: &RemedyDefinition,
    adj: &HashMap<&str, Vec<&str>>,
    problems: &mut Vec<CatalogError>,
) {
    let mut in_degree: HashMap<&str, usize> = adj.keys().map(|&k| (k, 0)).collect();
    for neighbors in adj.values() {
        for &n in neighbors {
            *in_degree.entry(n).or_insert(0) += 1;
        }
    }

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(&k, _)| k)
        .collect();
    let mut processed: HashSet<&str> = HashSet::new();
    while let Some(node) = queue.pop_front() {
        processed.insert(node);
        for &neighbor in adj.get(node).into_iter().flatten() {
            if let Some(deg) = in_degree.get_mut(neighbor) {
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(neighbor);
                }
            }
        }
    }

    if processed.len() < adj.len() {
        let cyclic: BTreeSet<String> = adj
            .keys()
            .filter(|s| !processed.contains(*s))
            .map(|s| s.to_string())
            .collect();
        problems.push(CatalogError::StepCycle {
            definition_id: definition.id.clone(),
            steps: cyclic.into_iter().collect(),
        });
    }
}

pub(super) fn check_playbook(
    playbook: &MissionPlaybook,
    catalog: &Catalog,
    problems: &mut Vec<CatalogError>,
) {
    let Some(first) = playbook.first_step() else {
        problems.push(CatalogError::EmptyPlaybook {
            playbook_id: playbook.id.clone(),
        });
        return;
    };

    let mut by_order: BTreeMap<u32, &MissionStep> = BTreeMap::new();
    for step in &playbook.steps {
        if by_order.insert(step.order, step).is_some() {
            problems.push(CatalogError::DuplicateOrder {
                playbook_id: playbook.id.clone(),
                order: step.order,
            });
        }
        if catalog.remedy(&step.remedy_definition_id).is_none() {
            problems.push(CatalogError::UnknownRemedyDefinition {
                playbook_id: playbook.id.clone(),
                order: step.order,
                definition_id: step.remedy_definition_id.clone(),
            });
        }
    }

    for step in &playbook.steps {
        for target in step.transitions.orders() {
            if !by_order.contains_key(&target) {
                problems.push(CatalogError::UnknownOrder {
                    playbook_id: playbook.id.clone(),
                    order: step.order,
                    target,
                });
            } else if target <= step.order {
                problems.push(CatalogError::BackwardTransition {
                    playbook_id: playbook.id.clone(),
                    order: step.order,
                    target,
                });
            }
        }
    }

    // Transitions only move forward, so a plain walk terminates.
    let mut reached: BTreeSet<u32> = BTreeSet::new();
    let mut queue: VecDeque<u32> = VecDeque::from([first.order]);
    while let Some(order) = queue.pop_front() {
        if !reached.insert(order) {
            continue;
        }
        if let Some(step) = by_order.get(&order) {
            queue.extend(step.transitions.orders().filter(|&t| t > order));
        }
    }
    for &order in by_order.keys() {
        if !reached.contains(&order) {
            problems.push(CatalogError::UnreachableMissionStep {
                playbook_id: playbook.id.clone(),
                order,
            });
        }
    }
}
