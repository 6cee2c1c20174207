//! Monte Carlo Tree Search over simulator clones.
//!
//! UCB1 selection, heuristic-guided expansion and rollouts, visit-count
//! final selection. The tree is arena-allocated: nodes live in a `Vec`
//! and point at parents and children by index, so each child is
//! uniquely owned and no reference counting is involved.

use std::time::{Duration, Instant};

use crate::heuristics::{evaluate_plays, get_best_play, HeuristicConfig};
use crate::simulator::{BlindKind, GamePhase, GameSimulator};

/// An action in the search tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MctsAction {
    Play(Vec<usize>),
    Discard(Vec<usize>),
    StartBlind,
    SkipBlind,
    EndShop,
}

/// Search limits and value weights.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    pub max_iterations: usize,
    pub max_time: Duration,
    pub exploration_constant: f64,
    pub max_rollout_depth: usize,
    pub win_value: f64,
    /// Partial credit per ante reached.
    pub ante_value: f64,
    /// Partial credit per blind beaten within the ante.
    pub blind_value: f64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            max_time: Duration::from_secs(5),
            exploration_constant: std::f64::consts::SQRT_2,
            max_rollout_depth: 50,
            win_value: 1.0,
            ante_value: 0.1,
            blind_value: 0.03,
        }
    }
}

/// A node in the search tree, indexed within the arena.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// The action that led here; `None` for the root.
    pub action: Option<MctsAction>,
    pub visits: usize,
    pub total_value: f64,
    pub wins: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub untried_actions: Vec<MctsAction>,
}

impl MctsNode {
    fn new(action: Option<MctsAction>, parent: Option<usize>, untried: Vec<MctsAction>) -> Self {
        Self {
            action,
            visits: 0,
            total_value: 0.0,
            wins: 0,
            parent,
            children: Vec::new(),
            untried_actions: untried,
        }
    }

    pub fn average_value(&self) -> f64 {
        if self.visits == 0 {
            return 0.0;
        }
        self.total_value / self.visits as f64
    }

    pub fn win_rate(&self) -> f64 {
        if self.visits == 0 {
            return 0.0;
        }
        self.wins as f64 / self.visits as f64
    }
}

/// Per-action statistics at the root, for inspection and tests.
#[derive(Debug, Clone)]
pub struct ActionStats {
    pub action: MctsAction,
    pub visits: usize,
    pub average_value: f64,
    pub win_rate: f64,
}

/// All legal actions from a simulator state.
pub fn legal_actions(game: &GameSimulator) -> Vec<MctsAction> {
    let mut actions = Vec::new();
    match game.phase {
        GamePhase::BlindSelect => {
            actions.push(MctsAction::StartBlind);
            if game.blind != BlindKind::Boss {
                actions.push(MctsAction::SkipBlind);
            }
        }
        GamePhase::Playing => {
            for indices in game.legal_plays() {
                actions.push(MctsAction::Play(indices));
            }
            for indices in game.legal_discards() {
                actions.push(MctsAction::Discard(indices));
            }
        }
        GamePhase::Shop => {
            actions.push(MctsAction::EndShop);
        }
        GamePhase::GameOver => {}
    }
    actions
}

/// Apply an action to a simulator, ignoring refusals (actions come
/// from `legal_actions` and are valid by construction).
pub fn apply_action(game: &mut GameSimulator, action: &MctsAction) {
    match action {
        MctsAction::Play(indices) => {
            let _ = game.play_hand(indices);
        }
        MctsAction::Discard(indices) => {
            let _ = game.discard(indices);
        }
        MctsAction::StartBlind => {
            let _ = game.start_blind();
        }
        MctsAction::SkipBlind => {
            let _ = game.skip_blind();
        }
        MctsAction::EndShop => {
            let _ = game.end_shop();
        }
    }
}

/// The searcher. Holds the arena for the most recent `search` call so
/// statistics stay inspectable afterwards.
#[derive(Debug, Clone)]
pub struct Mcts {
    pub config: MctsConfig,
    nodes: Vec<MctsNode>,
    pub iterations: usize,
    pub total_rollouts: usize,
}

impl Mcts {
    pub fn new(config: MctsConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            iterations: 0,
            total_rollouts: 0,
        }
    }

    /// Run the search from the given state and return the best action
    /// by visit count, or `None` when no actions are available.
    pub fn search(&mut self, game: &GameSimulator) -> Option<MctsAction> {
        self.nodes = vec![MctsNode::new(None, None, legal_actions(game))];
        self.iterations = 0;

        if self.nodes[0].untried_actions.is_empty() {
            return None;
        }

        let start = Instant::now();
        while self.iterations < self.config.max_iterations
            && start.elapsed() < self.config.max_time
        {
            self.iterations += 1;

            let mut sim = game.clone();
            let mut index = self.select(&mut sim);

            if !sim.is_game_over() && !self.nodes[index].untried_actions.is_empty() {
                index = self.expand(index, &mut sim);
            }

            let value = self.simulate(&mut sim);
            self.total_rollouts += 1;

            self.backpropagate(index, value, sim.is_won());
        }

        self.best_action()
    }

    /// UCB1 value of a node; unvisited nodes are infinitely urgent.
    fn ucb1(&self, index: usize) -> f64 {
        let node = &self.nodes[index];
        if node.visits == 0 {
            return f64::INFINITY;
        }
        let exploitation = node.average_value();
        let parent_visits = node
            .parent
            .map(|p| self.nodes[p].visits)
            .unwrap_or(node.visits);
        if parent_visits == 0 {
            return exploitation;
        }
        exploitation
            + self.config.exploration_constant
                * ((parent_visits as f64).ln() / node.visits as f64).sqrt()
    }

    /// Descend by UCB1 until reaching a node with untried actions or
    /// no children, replaying each chosen action on the simulator.
    fn select(&self, sim: &mut GameSimulator) -> usize {
        let mut index = 0;
        while self.nodes[index].untried_actions.is_empty()
            && !self.nodes[index].children.is_empty()
        {
            let best = self.nodes[index]
                .children
                .iter()
                .copied()
                .max_by(|a, b| self.ucb1(*a).total_cmp(&self.ucb1(*b)))
                .expect("children is non-empty");

            if let Some(action) = &self.nodes[best].action {
                apply_action(sim, action);
            }
            index = best;
        }
        index
    }

    /// Add one child for an untried action, preferring the
    /// heuristically best play.
    fn expand(&mut self, index: usize, sim: &mut GameSimulator) -> usize {
        let action = self.pick_untried_action(index, sim);
        let position = self.nodes[index]
            .untried_actions
            .iter()
            .position(|a| *a == action)
            .expect("action came from the untried list");
        self.nodes[index].untried_actions.remove(position);

        apply_action(sim, &action);

        let child = MctsNode::new(Some(action), Some(index), legal_actions(sim));
        let child_index = self.nodes.len();
        self.nodes.push(child);
        self.nodes[index].children.push(child_index);
        child_index
    }

    fn pick_untried_action(&self, index: usize, sim: &GameSimulator) -> MctsAction {
        let untried = &self.nodes[index].untried_actions;

        // Prefer the strongest untried play by heuristic score
        if sim.phase == GamePhase::Playing {
            let state = sim.game_state();
            let scored = evaluate_plays(
                &sim.hand,
                &sim.jokers,
                &state,
                sim.blind_chips,
                sim.current_chips,
                sim.hands_remaining,
                &HeuristicConfig::default(),
            );
            for candidate in &scored {
                let as_action = MctsAction::Play(candidate.card_indices.clone());
                if untried.contains(&as_action) {
                    return as_action;
                }
            }
        }

        untried[0].clone()
    }

    /// Roll out with the heuristic policy to a terminal state, capped
    /// by depth, and score the end position.
    fn simulate(&self, sim: &mut GameSimulator) -> f64 {
        let mut depth = 0;
        while !sim.is_game_over() && depth < self.config.max_rollout_depth {
            match sim.phase {
                GamePhase::BlindSelect => {
                    let _ = sim.start_blind();
                }
                GamePhase::Playing => {
                    let state = sim.game_state();
                    match get_best_play(
                        &sim.hand,
                        &sim.jokers,
                        &state,
                        sim.blind_chips,
                        sim.current_chips,
                        sim.hands_remaining,
                    ) {
                        Some(best) => {
                            let _ = sim.play_hand(&best.card_indices);
                        }
                        None => break,
                    }
                }
                GamePhase::Shop => {
                    let _ = sim.end_shop();
                }
                GamePhase::GameOver => break,
            }
            depth += 1;
        }
        self.evaluate_terminal(sim)
    }

    /// Terminal value: 1.0 on a win, otherwise partial credit for
    /// progress, clamped below the win value.
    fn evaluate_terminal(&self, sim: &GameSimulator) -> f64 {
        if sim.is_won() {
            return self.config.win_value;
        }
        let value = sim.ante as f64 * self.config.ante_value
            + sim.blind.progress() as f64 * self.config.blind_value;
        value.min(self.config.win_value)
    }

    fn backpropagate(&mut self, mut index: usize, value: f64, won: bool) {
        loop {
            let node = &mut self.nodes[index];
            node.visits += 1;
            node.total_value += value;
            if won {
                node.wins += 1;
            }
            match node.parent {
                Some(parent) => index = parent,
                None => break,
            }
        }
    }

    /// Final selection: the root child with the most visits, which is
    /// more robust than the highest average on small budgets.
    fn best_action(&self) -> Option<MctsAction> {
        self.nodes[0]
            .children
            .iter()
            .max_by_key(|&&child| self.nodes[child].visits)
            .and_then(|&child| self.nodes[child].action.clone())
    }

    pub fn root_visits(&self) -> usize {
        self.nodes.first().map(|n| n.visits).unwrap_or(0)
    }

    /// Statistics for each explored root action.
    pub fn action_stats(&self) -> Vec<ActionStats> {
        let Some(root) = self.nodes.first() else {
            return Vec::new();
        };
        root.children
            .iter()
            .map(|&child| {
                let node = &self.nodes[child];
                ActionStats {
                    action: node.action.clone().expect("children carry actions"),
                    visits: node.visits,
                    average_value: node.average_value(),
                    win_rate: node.win_rate(),
                }
            })
            .collect()
    }
}

impl Default for Mcts {
    fn default() -> Self {
        Self::new(MctsConfig::default())
    }
}

/// A player that searches every decision.
#[derive(Debug, Clone, Default)]
pub struct MctsPlayer {
    pub mcts: Mcts,
    pub games_played: usize,
    pub games_won: usize,
}

impl MctsPlayer {
    pub fn new(config: MctsConfig) -> Self {
        Self {
            mcts: Mcts::new(config),
            games_played: 0,
            games_won: 0,
        }
    }

    pub fn get_action(&mut self, game: &GameSimulator) -> Option<MctsAction> {
        self.mcts.search(game)
    }

    /// Drive a complete game; true on a win.
    pub fn play_game(&mut self, game: &mut GameSimulator) -> bool {
        self.games_played += 1;

        while !game.is_game_over() {
            match self.get_action(game) {
                Some(action) => apply_action(game, &action),
                None => match game.phase {
                    GamePhase::BlindSelect => {
                        let _ = game.start_blind();
                    }
                    GamePhase::Shop => {
                        let _ = game.end_shop();
                    }
                    _ => break,
                },
            }
        }

        if game.is_won() {
            self.games_won += 1;
            return true;
        }
        false
    }
}

/// One-off search with explicit limits.
pub fn quick_mcts_action(
    game: &GameSimulator,
    iterations: usize,
    time_limit: Duration,
) -> Option<MctsAction> {
    let config = MctsConfig {
        max_iterations: iterations,
        max_time: time_limit,
        ..MctsConfig::default()
    };
    Mcts::new(config).search(game)
}
