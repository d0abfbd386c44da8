extern crate std;

use milestone_escrow::{MilestoneEscrow, MilestoneEscrowClient};
use soroban_sdk::{
    testutils::{Address as _, Events, Ledger},
    token, vec, Address, Env, String, Symbol, TryIntoVal, Val, Vec,
};

use crate::{GovernanceConfig, MilestoneGovernance, MilestoneGovernanceClient};

pub const GOAL: i128 = 10;
pub const START: u64 = 1_000;
pub const DEADLINE: u64 = START + 86_400;

/// A real escrow wired to a governance instance.
pub struct Dao {
    pub env: Env,
    pub escrow: MilestoneEscrowClient<'static>,
    pub gov: MilestoneGovernanceClient<'static>,
    /// Asset the campaign is funded in.
    pub token: token::Client<'static>,
    /// Asset voters stake.
    pub stake_token: token::Client<'static>,
    pub beneficiary: Address,
}

impl Dao {
    pub fn fund(&self, donor: &Address, amount: i128) {
        token::StellarAssetClient::new(&self.env, &self.token.address).mint(donor, &amount);
        self.escrow.donate(donor, &amount);
    }

    /// A fresh voter holding and staking `amount`.
    pub fn staker(&self, amount: i128) -> Address {
        let voter = Address::generate(&self.env);
        token::StellarAssetClient::new(&self.env, &self.stake_token.address).mint(&voter, &amount);
        self.gov.stake(&voter, &amount);
        voter
    }

    pub fn evidence(&self) -> String {
        String::from_str(&self.env, "ipfs://bafy-stage-report")
    }

    pub fn propose(&self, stage: u32) -> u64 {
        self.gov.create_milestone_proposal(&stage, &self.evidence())
    }

    /// Jump to the first moment `proposal_id` can be finalised.
    pub fn close_window(&self, proposal_id: u64) {
        let end = self.gov.get_proposal(&proposal_id).voting_end;
        self.env.ledger().set_timestamp(end);
    }

    /// Propose `stage`, have every voter vote `in_favor`, and finalise.
    pub fn decide(&self, stage: u32, voters: &[&Address], in_favor: bool) -> u64 {
        let id = self.propose(stage);
        for voter in voters {
            self.gov.vote(voter, &id, &in_favor);
        }
        self.close_window(id);
        self.gov.check_vote_result(&id);
        id
    }
}

pub fn create_token(env: &Env, admin: &Address) -> token::Client<'static> {
    let addr = env.register_stellar_asset_contract_v2(admin.clone());
    token::Client::new(env, &addr.address())
}

/// Escrow (goal 10, five stages of 2) and governance with default policy,
/// nothing donated or staked yet.
pub fn setup_dao() -> Dao {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START);

    let admin = Address::generate(&env);
    let token = create_token(&env, &admin);
    let stake_token = create_token(&env, &admin);
    let beneficiary = Address::generate(&env);

    let escrow_id = env.register(MilestoneEscrow, ());
    let escrow = MilestoneEscrowClient::new(&env, &escrow_id);
    escrow.init(
        &beneficiary,
        &token.address,
        &GOAL,
        &DEADLINE,
        &vec![&env, 2, 2, 2, 2, 2],
    );

    let gov_id = env.register(MilestoneGovernance, ());
    let gov = MilestoneGovernanceClient::new(&env, &gov_id);
    gov.init(&escrow_id, &stake_token.address, &GovernanceConfig::default());
    escrow.set_governance_authority(&gov_id);

    Dao {
        env,
        escrow,
        gov,
        token,
        stake_token,
        beneficiary,
    }
}

/// Donor A gives 6 and donor B gives 4, reaching the goal.
pub fn setup_funded_dao() -> (Dao, Address, Address) {
    let dao = setup_dao();
    let donor_a = Address::generate(&dao.env);
    let donor_b = Address::generate(&dao.env);
    dao.fund(&donor_a, 6);
    dao.fund(&donor_b, 4);
    (dao, donor_a, donor_b)
}

/// Funded campaign with two voters of weight 2 and 3.
pub fn setup_voting_dao() -> (Dao, Address, Address) {
    let (dao, _, _) = setup_funded_dao();
    let light = dao.staker(2);
    let heavy = dao.staker(3);
    (dao, light, heavy)
}

/// The most recent event `contract` published under leading topic `topic`.
pub fn last_event(env: &Env, contract: &Address, topic: Symbol) -> Option<(Vec<Val>, Val)> {
    let all = env.events().all();
    for i in (0..all.len()).rev() {
        let (source, topics, data) = all.get(i)?;
        if &source != contract {
            continue;
        }
        if let Some(first) = topics.get(0) {
            let first: Result<Symbol, _> = first.try_into_val(env);
            if first.map(|s| s == topic).unwrap_or(false) {
                return Some((topics, data));
            }
        }
    }
    None
}
