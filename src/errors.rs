// Authorization
pub const ERR_NOT_ORGANIZATION: &str = "Only the organization can call this";
pub const ERR_REENTRANT_CALL: &str = "Reentrant call";
pub const ERR_BELOW_PROPOSAL_THRESHOLD: &str = "Votes below proposal threshold";

// Validation
pub const ERR_ZERO_AMOUNT: &str = "Amount must be positive";
pub const ERR_ZERO_ADDRESS: &str = "Zero address";
pub const ERR_INSUFFICIENT_BALANCE: &str = "Insufficient balance";
pub const ERR_SPLIT_LENGTH: &str = "Split must name 1 to 4 delegates";
pub const ERR_SPLIT_ARITY: &str = "Delegates and basis points differ in length";
pub const ERR_SPLIT_DUPLICATE: &str = "Duplicate delegate";
pub const ERR_SPLIT_BPS_SUM: &str = "Basis points must sum to 10000";
pub const ERR_QUORUM_BPS_RANGE: &str = "Quorum basis points out of range";
pub const ERR_UNSORTED_ASSETS: &str = "Assets must be sorted without duplicates";
pub const ERR_NOTHING_TO_QUIT: &str = "Nothing to ragequit";
pub const ERR_MISSING_ENDPOINT: &str = "Same-context call needs an endpoint";

// State
pub const ERR_NOT_HISTORICAL: &str = "Height must be in the past";
pub const ERR_ALREADY_EXECUTED: &str = "Already executed";
pub const ERR_ALREADY_VOTED: &str = "Already voted";
pub const ERR_NO_VOTING_POWER: &str = "No voting power at snapshot";
pub const ERR_VOTING_CLOSED: &str = "Decision window has elapsed";
pub const ERR_NOT_SUCCEEDED: &str = "Proposal has not succeeded";
pub const ERR_NOT_EXECUTABLE: &str = "Proposal is not executable";
pub const ERR_TIMELOCKED: &str = "Timelock has not elapsed";
pub const ERR_NO_PERMIT: &str = "No permit uses left";
pub const ERR_FUTARCHY_EXISTS: &str = "Futarchy already enabled";
pub const ERR_FUTARCHY_DISABLED: &str = "Futarchy not enabled";
pub const ERR_FUTARCHY_RESOLVED: &str = "Futarchy already resolved";
pub const ERR_FUTARCHY_UNRESOLVED: &str = "Futarchy not resolved";
pub const ERR_FUTARCHY_WRONG_ASSET: &str = "Wrong reward asset";
pub const ERR_NOT_EXPIRED: &str = "Proposal has not expired";
pub const ERR_BADGE_EXISTS: &str = "Badge already minted";
pub const ERR_BADGE_MISSING: &str = "No badge to burn";
