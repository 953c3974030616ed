//! Scenario files and their replay against an in-memory pool.
//!
//! A scenario names its stakers with opening stake-token balances and lists
//! steps to run against a freshly deployed pool driven by a manual clock.
//! Engine rejections are recorded in the report and do not stop the run;
//! a step naming an unknown staker does.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use stakepool_core::traits::{Clock, TokenGateway};
use stakepool_core::types::{Address, Amount, Timestamp};
use stakepool_engine::{Deployment, ManualClock, PoolConfig, StakingEvent};

/// Address that deploys the pool and owns it.
pub const DEPLOYER: Address = Address([0xD0; 20]);

/// Name under which scenarios refer to the deployer.
pub const OWNER: &str = "owner";

const DEFAULT_START: Timestamp = 1_700_000_000;

fn default_start() -> Timestamp {
    DEFAULT_START
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Clock reading at deployment.
    #[serde(default = "default_start")]
    pub start: Timestamp,
    /// Staker name to opening stake-token balance.
    #[serde(default)]
    pub stakers: BTreeMap<String, u64>,
    pub steps: Vec<Step>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    Fund { amount: u64 },
    Approve { staker: String, amount: u64 },
    Stake { staker: String, amount: u64 },
    Withdraw { staker: String, amount: u64 },
    Claim { staker: String },
    Advance { seconds: u64 },
    Query { staker: String },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fund { .. } => "fund",
            Self::Approve { .. } => "approve",
            Self::Stake { .. } => "stake",
            Self::Withdraw { .. } => "withdraw",
            Self::Claim { .. } => "claim",
            Self::Advance { .. } => "advance",
            Self::Query { .. } => "query",
        }
    }
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid scenario")
    }
}

/// One staker's position at a point in the run.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StakerView {
    pub name: String,
    pub address: Address,
    pub staked: Amount,
    pub pending_reward: Amount,
    pub lot_rewards: Vec<Amount>,
    pub stake_balance: Amount,
    pub reward_balance: Amount,
}

#[derive(Serialize, Debug, Clone)]
pub struct StepReport {
    pub index: usize,
    pub action: &'static str,
    pub time: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<StakingEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<StakerView>,
}

#[derive(Serialize, Debug, Clone)]
pub struct Summary {
    pub time: Timestamp,
    pub funded: bool,
    pub total_staked: Amount,
    pub checkpoints: usize,
    pub conserved: bool,
    pub stakers: Vec<StakerView>,
}

#[derive(Serialize, Debug, Clone)]
pub struct Report {
    pub engine: Address,
    pub reward_rate: Amount,
    pub steps: Vec<StepReport>,
    pub summary: Summary,
}

/// A deployed pool plus the scenario's name book.
pub struct Simulation {
    deployment: Deployment,
    clock: Arc<ManualClock>,
    names: BTreeMap<String, Address>,
}

impl Simulation {
    /// Deploy a pool and issue every staker its opening balance.
    ///
    /// Staker `i` (in name order) gets the deployer's `i + 1`-th derived
    /// address; nonce 0 is the engine's.
    pub fn new(config: &PoolConfig, scenario: &Scenario) -> Result<Self> {
        let clock = Arc::new(ManualClock::new(scenario.start));
        let deployment = Deployment::deploy(config, DEPLOYER, clock.clone())
            .context("deploying pool")?;

        let mut names = BTreeMap::new();
        names.insert(OWNER.to_string(), DEPLOYER);
        for (i, (name, balance)) in scenario.stakers.iter().enumerate() {
            anyhow::ensure!(name != OWNER, "staker name {OWNER:?} is reserved");
            let address = DEPLOYER.derive(i as u64 + 1);
            deployment
                .airdrop(&address, Amount::from(*balance))
                .with_context(|| format!("issuing opening balance to {name}"))?;
            debug!(name = %name, %address, balance, "staker registered");
            names.insert(name.clone(), address);
        }
        Ok(Self { deployment, clock, names })
    }

    /// Replay every step and summarize the final state.
    pub fn run(mut self, steps: &[Step]) -> Result<Report> {
        let mut reports = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            reports.push(self.step(index, step)?);
        }
        let summary = self.summary()?;
        info!(
            steps = reports.len(),
            total_staked = summary.total_staked,
            conserved = summary.conserved,
            "scenario finished"
        );
        Ok(Report {
            engine: self.deployment.engine_address(),
            reward_rate: self.deployment.engine.reward_rate(),
            steps: reports,
            summary,
        })
    }

    fn address(&self, name: &str) -> Result<Address> {
        self.names
            .get(name)
            .copied()
            .with_context(|| format!("unknown staker {name:?}"))
    }

    fn step(&mut self, index: usize, step: &Step) -> Result<StepReport> {
        let mut query = None;
        let error = match step {
            Step::Fund { amount } => self.deployment.fund(Amount::from(*amount)).err().map(|e| e.to_string()),
            Step::Approve { staker, amount } => {
                let who = self.address(staker)?;
                self.deployment.approve(&who, Amount::from(*amount));
                None
            }
            Step::Stake { staker, amount } => {
                let who = self.address(staker)?;
                self.deployment.engine.stake(&who, Amount::from(*amount)).err().map(|e| e.to_string())
            }
            Step::Withdraw { staker, amount } => {
                let who = self.address(staker)?;
                self.deployment.engine.withdraw(&who, Amount::from(*amount)).err().map(|e| e.to_string())
            }
            Step::Claim { staker } => {
                let who = self.address(staker)?;
                self.deployment.engine.claim_rewards(&who).err().map(|e| e.to_string())
            }
            Step::Advance { seconds } => {
                self.clock.advance(*seconds);
                None
            }
            Step::Query { staker } => {
                query = Some(self.view(staker)?);
                None
            }
        };
        Ok(StepReport {
            index,
            action: step.name(),
            time: self.clock.now(),
            error,
            events: self.deployment.engine.drain_events(),
            query,
        })
    }

    fn view(&self, name: &str) -> Result<StakerView> {
        let address = self.address(name)?;
        let engine = &self.deployment.engine;
        Ok(StakerView {
            name: name.to_string(),
            address,
            staked: engine.staked_balance(&address)?,
            pending_reward: engine.staker_rewards(&address)?,
            lot_rewards: engine.lot_rewards(&address)?,
            stake_balance: self.deployment.stake_token.balance_of(&address),
            reward_balance: self.deployment.reward_token.balance_of(&address),
        })
    }

    fn summary(&self) -> Result<Summary> {
        let engine = &self.deployment.engine;
        let stakers = self
            .names
            .keys()
            .map(|name| self.view(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(Summary {
            time: self.clock.now(),
            funded: engine.is_funded(),
            total_staked: engine.total_staked(),
            checkpoints: engine.checkpoints().len(),
            conserved: engine.audit(),
            stakers,
        })
    }
}
