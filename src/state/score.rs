//! Round scoring. Pure functions over the collected ballots; nothing here
//! touches room state or fails. Missing or malformed ballots count as empty
//! accusation lists.

use crate::types::*;
use std::collections::{HashMap, HashSet};

/// Flatten all ballots into a single tally of accusation counts per name.
/// An empty ballot counts under the [`NO_ACCUSATION`] bucket.
pub fn tally_votes(votes: &HashMap<String, Vec<String>>) -> HashMap<String, u32> {
    let mut tally: HashMap<String, u32> = HashMap::new();
    for accused in votes.values() {
        if accused.is_empty() {
            *tally.entry(NO_ACCUSATION.to_string()).or_insert(0) += 1;
        } else {
            for name in accused {
                *tally.entry(name.clone()).or_insert(0) += 1;
            }
        }
    }
    tally
}

/// Names that reached the maximum tally count. The abstention bucket is
/// excluded from the result so it never resolves as an accusation outcome.
pub fn top_voted(tally: &HashMap<String, u32>) -> HashSet<String> {
    let max = match tally.values().max() {
        Some(max) => *max,
        None => return HashSet::new(),
    };
    tally
        .iter()
        .filter(|(name, count)| **count == max && name.as_str() != NO_ACCUSATION)
        .map(|(name, _)| name.clone())
        .collect()
}

/// Compute per-player score deltas for one round. A player is an impostor
/// iff their display name is in `impostors`; "caught" means the name is in
/// the resolved top-voted set.
pub fn score_round(
    players: &[Player],
    impostors: &HashSet<String>,
    votes: &HashMap<String, Vec<String>>,
    mode: ImpostorMode,
) -> HashMap<String, i32> {
    let top = top_voted(&tally_votes(votes));
    let empty: Vec<String> = Vec::new();

    let mut deltas = HashMap::new();
    for player in players {
        let name = &player.name;
        let is_impostor = impostors.contains(name);
        let ballot = votes.get(name).unwrap_or(&empty);

        let delta = match mode {
            ImpostorMode::One => {
                if is_impostor {
                    // +2 for escaping, nothing when caught
                    if top.contains(name) {
                        0
                    } else {
                        2
                    }
                } else if ballot.iter().any(|accused| impostors.contains(accused)) {
                    1
                } else {
                    0
                }
            }
            ImpostorMode::Variable => {
                let mut delta = 0;
                if is_impostor {
                    if !top.contains(name) {
                        delta += 2;
                    }
                } else if top.contains(name) {
                    // Falsely resolved as impostor
                    delta -= 1;
                }

                let mut accused_normals = 0;
                for accused in ballot {
                    if impostors.contains(accused) {
                        delta += 1;
                    } else {
                        delta -= 1;
                        accused_normals += 1;
                    }
                }

                // Clean ballot: no normal accused, every impostor named.
                // Trivially satisfied when the round rolled zero impostors.
                let all_impostors_named = impostors
                    .iter()
                    .all(|impostor| ballot.contains(impostor));
                if accused_normals == 0 && all_impostors_named {
                    delta += 1;
                }

                delta
            }
        };

        deltas.insert(name.clone(), delta);
    }

    deltas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players(names: &[&str]) -> Vec<Player> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Player {
                id: format!("conn{}", i),
                name: name.to_string(),
            })
            .collect()
    }

    fn votes(entries: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(voter, accused)| {
                (
                    voter.to_string(),
                    accused.iter().map(|n| n.to_string()).collect(),
                )
            })
            .collect()
    }

    fn impostors(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_tally_counts_abstentions_separately() {
        let v = votes(&[("A", &["B"]), ("B", &[]), ("C", &["B"])]);
        let tally = tally_votes(&v);
        assert_eq!(tally.get("B"), Some(&2));
        assert_eq!(tally.get(NO_ACCUSATION), Some(&1));
    }

    #[test]
    fn test_top_voted_excludes_abstention_bucket() {
        // Abstentions outnumber every accusation; nothing is top-voted
        let v = votes(&[("A", &[]), ("B", &[]), ("C", &["A"])]);
        let top = top_voted(&tally_votes(&v));
        assert!(top.is_empty());
    }

    #[test]
    fn test_top_voted_reports_ties() {
        let v = votes(&[("A", &["B"]), ("B", &["A"]), ("C", &["C"])]);
        let top = top_voted(&tally_votes(&v));
        assert_eq!(top.len(), 3);
    }

    #[test]
    fn test_mode_one_caught_impostor_scenario() {
        // The canonical three-player round: A and C catch B
        let p = players(&["A", "B", "C"]);
        let imp = impostors(&["B"]);
        let v = votes(&[("A", &["B"]), ("B", &["A"]), ("C", &["B"])]);

        let top = top_voted(&tally_votes(&v));
        assert_eq!(top, impostors(&["B"]));

        let deltas = score_round(&p, &imp, &v, ImpostorMode::One);
        assert_eq!(deltas.get("A"), Some(&1));
        assert_eq!(deltas.get("B"), Some(&0));
        assert_eq!(deltas.get("C"), Some(&1));
    }

    #[test]
    fn test_mode_one_escaped_impostor_gets_two() {
        let p = players(&["A", "B", "C"]);
        let imp = impostors(&["B"]);
        // Everyone (including B) piles on A
        let v = votes(&[("A", &["C"]), ("B", &["A"]), ("C", &["A"])]);

        let deltas = score_round(&p, &imp, &v, ImpostorMode::One);
        assert_eq!(deltas.get("B"), Some(&2));
        assert_eq!(deltas.get("A"), Some(&0));
        assert_eq!(deltas.get("C"), Some(&0));
    }

    #[test]
    fn test_mode_variable_accusations_stack() {
        let p = players(&["A", "B", "C", "D"]);
        let imp = impostors(&["B", "C"]);
        // A names both impostors: +1 +1 and the clean-ballot bonus
        // D names one impostor and one normal: +1 -1, no bonus
        let v = votes(&[
            ("A", &["B", "C"]),
            ("B", &["A"]),
            ("C", &["A"]),
            ("D", &["B", "A"]),
        ]);

        let deltas = score_round(&p, &imp, &v, ImpostorMode::Variable);
        // A: caught-as-normal? tally: B=2, C=1, A=3 -> top = {A}; A -1, ballot +2, bonus +1
        assert_eq!(deltas.get("A"), Some(&2));
        // B: caught (not top? top={A}) -> escaped +2, ballot accused normal A -1
        assert_eq!(deltas.get("B"), Some(&1));
        // C: escaped +2, accused normal A -1
        assert_eq!(deltas.get("C"), Some(&1));
        // D: normal not top, ballot +1 -1
        assert_eq!(deltas.get("D"), Some(&0));
    }

    #[test]
    fn test_mode_variable_zero_impostors_clean_abstention() {
        let p = players(&["A", "B", "C"]);
        let imp = impostors(&[]);
        // A abstains (trivially clean), B accuses a normal, C abstains
        let v = votes(&[("A", &[]), ("B", &["C"]), ("C", &[])]);

        let deltas = score_round(&p, &imp, &v, ImpostorMode::Variable);
        // Two abstentions hold the max tally, so nothing resolves as
        // top-voted and C takes no false-accusation penalty
        assert_eq!(deltas.get("A"), Some(&1));
        // B accused a normal player and loses the bonus
        assert_eq!(deltas.get("B"), Some(&-1));
        assert_eq!(deltas.get("C"), Some(&1));
    }

    #[test]
    fn test_mode_variable_abstention_with_impostors_present_gets_no_bonus() {
        let p = players(&["A", "B", "C"]);
        let imp = impostors(&["B"]);
        let v = votes(&[("A", &[]), ("B", &["A"]), ("C", &["B"])]);

        let deltas = score_round(&p, &imp, &v, ImpostorMode::Variable);
        // A abstained: no accusations either way, impostor B unnamed -> no bonus
        assert_eq!(deltas.get("A"), Some(&0));
    }

    #[test]
    fn test_mode_variable_caught_impostor_gets_no_escape_bonus() {
        let p = players(&["A", "B", "C"]);
        let imp = impostors(&["B"]);
        let v = votes(&[("A", &["B"]), ("B", &["A"]), ("C", &["B"])]);

        let deltas = score_round(&p, &imp, &v, ImpostorMode::Variable);
        // B: caught (top), accused normal A -> -1
        assert_eq!(deltas.get("B"), Some(&-1));
        // A and C: correct accusation +1, clean ballot +1
        assert_eq!(deltas.get("A"), Some(&2));
        assert_eq!(deltas.get("C"), Some(&2));
    }

    #[test]
    fn test_missing_ballot_treated_as_empty() {
        let p = players(&["A", "B", "C"]);
        let imp = impostors(&["B"]);
        // C never voted at all
        let v = votes(&[("A", &["B"]), ("B", &["A"])]);

        let deltas = score_round(&p, &imp, &v, ImpostorMode::One);
        assert_eq!(deltas.get("C"), Some(&0));
        assert_eq!(deltas.len(), 3);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let p = players(&["A", "B", "C", "D"]);
        let imp = impostors(&["C"]);
        let v = votes(&[("A", &["C"]), ("B", &["D"]), ("C", &["A"]), ("D", &["C"])]);

        let first = score_round(&p, &imp, &v, ImpostorMode::Variable);
        for _ in 0..10 {
            assert_eq!(score_round(&p, &imp, &v, ImpostorMode::Variable), first);
        }
    }

    #[test]
    fn test_inputs_not_mutated() {
        let p = players(&["A", "B", "C"]);
        let imp = impostors(&["B"]);
        let v = votes(&[("A", &["B"]), ("B", &[]), ("C", &["B"])]);
        let v_before = v.clone();

        score_round(&p, &imp, &v, ImpostorMode::One);
        assert_eq!(v, v_before);
    }
}
