//! Fraud-ring assembly.
//!
//! Cycle and shell-chain findings each open a provisional ring. Rings
//! whose member sets overlap beyond the Jaccard threshold are merged
//! (the higher-scored ring contributes risk score and pattern type).
//! Ring membership is then reconciled with the suspicious output so the
//! report invariants hold: members are restricted to reported accounts,
//! each account belongs to exactly one ring (its highest-risk one), and
//! rings left with fewer than two members are dropped. Surviving rings
//! receive `RING-NNNN` ids in first-emission order.

use crate::types::FraudRing;
use hashbrown::{HashMap, HashSet};
use muleflow_detect::types::{Finding, PatternType};
use muleflow_graph::types::TxnGraph;

#[derive(Debug, Clone)]
struct ProvisionalRing {
    members: Vec<usize>,
    member_set: HashSet<usize>,
    pattern: PatternType,
    risk: u32,
}

/// Jaccard overlap of two member sets.
fn jaccard(a: &HashSet<usize>, b: &HashSet<usize>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Assemble rings from ring-forming findings.
///
/// `findings` must be in canonical sorted order; `reported` holds the
/// node indices present in the suspicious output. Returns the rings and
/// the node-to-ring-id assignment.
pub fn assemble(
    graph: &TxnGraph,
    findings: &[Finding],
    reported: &HashSet<usize>,
    jaccard_threshold: f64,
) -> (Vec<FraudRing>, HashMap<usize, String>) {
    // Open and merge provisional rings in finding order.
    let mut rings: Vec<ProvisionalRing> = Vec::new();
    for finding in findings.iter().filter(|f| f.pattern.forms_rings()) {
        let mut members: Vec<usize> = Vec::with_capacity(finding.accounts.len());
        let mut member_set: HashSet<usize> = HashSet::with_capacity(finding.accounts.len());
        for &node in &finding.accounts {
            if member_set.insert(node) {
                members.push(node);
            }
        }
        let risk = (finding.raw_score * 100.0).round() as u32;

        let target = rings
            .iter()
            .position(|ring| jaccard(&ring.member_set, &member_set) > jaccard_threshold);
        match target {
            Some(i) => {
                let ring = &mut rings[i];
                for &node in &members {
                    if ring.member_set.insert(node) {
                        ring.members.push(node);
                    }
                }
                if risk > ring.risk {
                    ring.risk = risk;
                    ring.pattern = finding.pattern;
                }
            }
            None => rings.push(ProvisionalRing {
                members,
                member_set,
                pattern: finding.pattern,
                risk,
            }),
        }
    }

    // Restrict membership to reported accounts.
    for ring in &mut rings {
        ring.members.retain(|node| reported.contains(node));
        ring.member_set.retain(|node| reported.contains(node));
    }

    // Assign every account to its highest-risk ring (ties resolve to the
    // earliest emission) and remove it from the others.
    let mut assignment: HashMap<usize, usize> = HashMap::new();
    for (i, ring) in rings.iter().enumerate() {
        for &node in &ring.members {
            let better = match assignment.get(&node) {
                Some(&current) => ring.risk > rings[current].risk,
                None => true,
            };
            if better {
                assignment.insert(node, i);
            }
        }
    }
    for (i, ring) in rings.iter_mut().enumerate() {
        ring.members.retain(|node| assignment.get(node) == Some(&i));
    }

    // Drop degenerate rings and hand out ids in first-emission order.
    let mut out: Vec<FraudRing> = Vec::new();
    let mut node_to_ring: HashMap<usize, String> = HashMap::new();
    for ring in rings.iter().filter(|ring| ring.members.len() >= 2) {
        let ring_id = format!("RING-{:04}", out.len() + 1);
        for &node in &ring.members {
            node_to_ring.insert(node, ring_id.clone());
        }
        out.push(FraudRing {
            ring_id,
            member_accounts: ring
                .members
                .iter()
                .map(|&node| graph.node(node).id.clone())
                .collect(),
            pattern_type: ring.pattern.as_str().to_string(),
            risk_score: ring.risk,
        });
    }

    (out, node_to_ring)
}
