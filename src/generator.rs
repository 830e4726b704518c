//! Seeded synthetic MDP generation.
//!
//! Produces small random MDPs for cross-checking the solvers against each
//! other. Episodic instances embed a shuffled chain through the
//! non-terminal states, so a terminal state is always reachable and
//! value iteration has a genuine fixed point to find.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::mdp::{Mdp, Transition};

/// Maximum out-degree of a generated (state, action) pair.
const MAX_DEGREE: usize = 5;

#[derive(Debug, Clone)]
pub struct MdpGenerator {
    pub num_states: usize,
    pub num_actions: usize,
    pub discount: f64,
    pub episodic: bool,
    pub seed: u64,
}

impl MdpGenerator {
    /// Generates a random MDP. The same configuration and seed always
    /// produce an identical instance.
    pub fn generate(&self) -> Mdp {
        let mut rng = StdRng::seed_from_u64(self.seed);
        if self.episodic {
            self.generate_episodic(&mut rng)
        } else {
            self.generate_continuing(&mut rng)
        }
    }

    /// No terminal states; every (state, action) fans out to a few random
    /// successors with normalized random probabilities.
    fn generate_continuing(&self, rng: &mut StdRng) -> Mdp {
        let n = self.num_states;
        let mut transitions = vec![vec![Vec::new(); self.num_actions]; n];
        let all_states: Vec<usize> = (0..n).collect();
        for per_action in transitions.iter_mut() {
            for list in per_action.iter_mut() {
                let degree = rng.gen_range(1..=MAX_DEGREE.min(n));
                let successors: Vec<usize> = all_states
                    .choose_multiple(rng, degree)
                    .copied()
                    .collect();
                let weights: Vec<f64> = (0..degree).map(|_| rng.gen::<f64>()).collect();
                let total: f64 = weights.iter().sum();
                for (next, weight) in successors.into_iter().zip(weights) {
                    list.push(Transition {
                        next,
                        reward: rng.gen_range(-1.0..1.0),
                        probability: weight / total,
                    });
                }
            }
        }
        Mdp {
            num_states: n,
            num_actions: self.num_actions,
            start: 0,
            terminals: Vec::new(),
            transitions,
            discount: self.discount,
            episodic: false,
        }
    }

    /// A random terminal set plus a shuffled chain through the remaining
    /// states; every action keeps the chain successor among its outcomes,
    /// padded with random distractors.
    fn generate_episodic(&self, rng: &mut StdRng) -> Mdp {
        let n = self.num_states;
        let num_terminals = if n <= 5 {
            2.min(n.saturating_sub(2))
        } else {
            2.max(n / 10)
        };
        let all_states: Vec<usize> = (0..n).collect();
        let mut terminals: Vec<usize> = all_states
            .choose_multiple(rng, num_terminals)
            .copied()
            .collect();
        let mut chain: Vec<usize> = (0..n).filter(|s| !terminals.contains(s)).collect();
        chain.shuffle(rng);
        // The chain's last state also terminates, so the chain always ends.
        if let Some(&last) = chain.last() {
            terminals.push(last);
        }

        let mut successor = vec![None; n];
        for pair in chain.windows(2) {
            successor[pair[0]] = Some(pair[1]);
        }

        let mut transitions = vec![vec![Vec::new(); self.num_actions]; n];
        for s in 0..n {
            if terminals.contains(&s) {
                continue;
            }
            let next = successor[s].unwrap_or(s);
            for list in transitions[s].iter_mut() {
                let degree = rng.gen_range(1..=MAX_DEGREE.min(n));
                let mut distractors: Vec<usize> =
                    (0..n).filter(|&x| x != next).collect();
                distractors.shuffle(rng);
                let weights: Vec<u32> = (0..degree).map(|_| rng.gen_range(1..=1000)).collect();
                let total: f64 = weights.iter().map(|&w| f64::from(w)).sum();
                for (i, &distractor) in distractors.iter().take(degree - 1).enumerate() {
                    list.push(Transition {
                        next: distractor,
                        reward: rng.gen_range(-1.0..1.0),
                        probability: f64::from(weights[i]) / total,
                    });
                }
                list.push(Transition {
                    next,
                    reward: rng.gen_range(-1.0..1.0),
                    probability: f64::from(weights[degree - 1]) / total,
                });
            }
        }

        Mdp {
            num_states: n,
            num_actions: self.num_actions,
            start: chain.first().copied().unwrap_or(0),
            terminals,
            transitions,
            discount: self.discount,
            episodic: true,
        }
    }
}
