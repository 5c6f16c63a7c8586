//! The order-building session: owns the draft and tracks the one
//! submission that may be in flight.

use crate::amount::TokenAmount;
use crate::config::TwapConfig;
use crate::draft::{DraftEdit, TwapOrderDraft};
use crate::error::{Result, TwapError};
use crate::order::{OrderAssembler, OrderRequest};
use crate::solver::Solver;
use crate::types::{B256, U256};
use crate::validation::{evaluate, ValidationContext, ValidationReport};
use tracing::{info, warn};

/// Lifecycle of the latest submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    /// Sent, waiting for the chain. The arguments are frozen.
    Pending { request: OrderRequest },
    Confirmed { tx_hash: B256 },
    Failed { message: String },
}

/// How a pending submission ended, as reported by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Confirmed(B256),
    Failed(String),
}

/// Fill the amount from the wallet balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceShortcut {
    Max,
    Half,
}

/// The whole balance as a typed value.
pub fn max_amount(balance: &TokenAmount) -> String {
    balance.to_exact()
}

/// Half the balance, rounded down to the token's precision.
pub fn half_amount(balance: &TokenAmount) -> String {
    TokenAmount::new(balance.raw() / U256::from(2u64), balance.decimals()).to_exact()
}

#[derive(Debug, Clone, Default)]
pub struct OrderSession {
    solver: Solver,
    assembler: OrderAssembler,
    draft: TwapOrderDraft,
    state: SubmissionState,
}

impl OrderSession {
    pub fn new(config: TwapConfig) -> Self {
        Self {
            solver: Solver::new(config.clone()),
            assembler: OrderAssembler::new(config),
            draft: TwapOrderDraft::new(),
            state: SubmissionState::Idle,
        }
    }

    pub fn config(&self) -> &TwapConfig {
        self.solver.config()
    }

    pub fn draft(&self) -> &TwapOrderDraft {
        &self.draft
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Apply an edit. A rejected edit leaves the draft as it was, apart
    /// from recording the message in `draft.error`.
    pub fn edit(&mut self, edit: DraftEdit, now_ms: u64) -> Result<&TwapOrderDraft> {
        match self.solver.apply(&self.draft, edit, now_ms) {
            Ok(next) => {
                self.draft = next;
                Ok(&self.draft)
            }
            Err(e) => {
                warn!("edit rejected: {}", e);
                self.draft.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Type the max or half of `balance` as the order amount.
    pub fn use_balance(
        &mut self,
        balance: &TokenAmount,
        shortcut: BalanceShortcut,
        now_ms: u64,
    ) -> Result<&TwapOrderDraft> {
        let value = match shortcut {
            BalanceShortcut::Max => max_amount(balance),
            BalanceShortcut::Half => half_amount(balance),
        };
        self.edit(DraftEdit::TypeInput(value), now_ms)
    }

    pub fn report(&self, ctx: &ValidationContext) -> ValidationReport {
        evaluate(self.config(), &self.draft, ctx)
    }

    /// Validate, re-anchor the deadline at `now_ms`, and assemble the
    /// order. Refused while another submission is pending.
    pub fn begin_submission(&mut self, ctx: &ValidationContext, now_ms: u64) -> Result<OrderRequest> {
        if matches!(self.state, SubmissionState::Pending { .. }) {
            return Err(TwapError::SubmissionPending);
        }
        if let Some(err) = self.report(ctx).status.into_error() {
            return Err(err);
        }

        // every attempt gets a fresh deadline
        self.draft = self.solver.apply(&self.draft, DraftEdit::UpdateDeadline, now_ms)?;
        let request = self.assembler.assemble(&self.draft, ctx.account)?;

        info!(
            "submitting order from {} to {}: {} chunks, deadline {}",
            request.from,
            request.to,
            self.draft.total_chunks.unwrap_or_default(),
            request.args.deadline
        );
        self.state = SubmissionState::Pending {
            request: request.clone(),
        };
        Ok(request)
    }

    /// Record how the pending submission ended. A confirmed order resets
    /// the draft; a failed one keeps it for another attempt.
    pub fn complete_submission(&mut self, outcome: SubmissionOutcome) -> Result<()> {
        if !matches!(self.state, SubmissionState::Pending { .. }) {
            return Err(TwapError::Submission("no submission pending".to_string()));
        }
        match outcome {
            SubmissionOutcome::Confirmed(tx_hash) => {
                info!("order confirmed in {}", tx_hash);
                self.draft = self.solver.apply(&self.draft, DraftEdit::Reset, 0)?;
                self.state = SubmissionState::Confirmed { tx_hash };
            }
            SubmissionOutcome::Failed(message) => {
                warn!("order submission failed: {}", message);
                self.draft.error = Some(message.clone());
                self.state = SubmissionState::Failed { message };
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::Field;
    use crate::error::AmountError;
    use crate::time::{TimeUnit, TimeValue, MINUTE_MS};
    use crate::types::{Address, Currency, Price};

    const NOW: u64 = 1_700_000_000_000;

    fn alice() -> Address {
        Address::repeat_byte(0xA1)
    }

    fn weth() -> Currency {
        Currency::token(Address::repeat_byte(0x01), 18, "WETH")
    }

    fn usdc() -> Currency {
        Currency::token(Address::repeat_byte(0x02), 6, "USDC")
    }

    fn ctx() -> ValidationContext {
        ValidationContext {
            account: Some(alice()),
            input_balance: None,
            input_usd: Some(Price::from_u128(1850, 1)),
            input_allowance: Some(TokenAmount::parse("10", 18).unwrap()),
        }
    }

    fn ready_session() -> OrderSession {
        let config = TwapConfig::default().with_twap_contract(Address::repeat_byte(0xCC));
        let mut session = OrderSession::new(config);
        for edit in [
            DraftEdit::SelectCurrency { field: Field::Input, currency: weth() },
            DraftEdit::SelectCurrency { field: Field::Output, currency: usdc() },
            DraftEdit::TypeInput("10".into()),
            DraftEdit::SetDuration(TimeValue::typed(TimeUnit::Minutes, "30")),
            DraftEdit::SetChunkSize(Some("1".into())),
        ] {
            session.edit(edit, NOW).unwrap();
        }
        session
    }

    #[test]
    fn test_rejected_edit_keeps_draft() {
        let mut session = ready_session();
        let before = session.draft().clone();

        let err = session.edit(DraftEdit::TypeInput("ten".into()), NOW).unwrap_err();
        assert!(matches!(err, TwapError::Parse(AmountError::Malformed(_))));
        assert_eq!(session.draft().typed_value, before.typed_value);
        assert_eq!(session.draft().chunk_size, before.chunk_size);
        assert_eq!(session.draft().error, Some(err.to_string()));
    }

    #[test]
    fn test_balance_shortcuts() {
        let balance = TokenAmount::parse("3", 6).unwrap();
        assert_eq!(max_amount(&balance), "3");
        assert_eq!(half_amount(&balance), "1.5");
        assert_eq!(half_amount(&TokenAmount::new(U256::from(1u64), 6)), "0");

        let mut session = ready_session();
        let balance = TokenAmount::parse("7", 18).unwrap();
        session.use_balance(&balance, BalanceShortcut::Half, NOW).unwrap();
        assert_eq!(session.draft().typed_value, "3.5");
        assert_eq!(session.draft().chunk_size, None);
    }

    #[test]
    fn test_submission_lifecycle() {
        let mut session = ready_session();
        let later = NOW + 10 * MINUTE_MS;

        let request = session.begin_submission(&ctx(), later).unwrap();
        // deadline recomputed from the submission time, plus the grace minute
        assert_eq!(request.args.deadline as u64, (later + 31 * MINUTE_MS) / 1000);
        assert!(matches!(session.state(), SubmissionState::Pending { .. }));

        assert_eq!(session.begin_submission(&ctx(), later), Err(TwapError::SubmissionPending));

        let tx_hash = B256::repeat_byte(0x77);
        session.complete_submission(SubmissionOutcome::Confirmed(tx_hash)).unwrap();
        assert_eq!(session.state(), &SubmissionState::Confirmed { tx_hash });
        assert_eq!(session.draft().typed_value, "");
        assert_eq!(session.draft().input_currency, Some(weth()));
        assert_eq!(session.draft().output_currency, None);
    }

    #[test]
    fn test_failed_submission_keeps_draft() {
        let mut session = ready_session();
        session.begin_submission(&ctx(), NOW).unwrap();
        let before = session.draft().clone();

        session
            .complete_submission(SubmissionOutcome::Failed("execution reverted".into()))
            .unwrap();
        assert_eq!(
            session.state(),
            &SubmissionState::Failed { message: "execution reverted".into() }
        );
        assert_eq!(session.draft().chunk_size, before.chunk_size);
        assert_eq!(session.draft().error.as_deref(), Some("execution reverted"));

        // retry is allowed and uses a fresh deadline
        let retry = session.begin_submission(&ctx(), NOW + 1_000).unwrap();
        assert_eq!(retry.args.deadline as u64, (NOW + 1_000 + 31 * MINUTE_MS) / 1000);
    }

    #[test]
    fn test_submission_blocked_by_gate() {
        let mut session = ready_session();
        let mut cheap = ctx();
        cheap.input_usd = Some(Price::parse("0.5").unwrap());

        let err = session.begin_submission(&cheap, NOW).unwrap_err();
        assert!(matches!(err, TwapError::EconomicFloor { .. }));
        assert_eq!(session.state(), &SubmissionState::Idle);
    }

    #[test]
    fn test_submission_waits_for_approval() {
        let mut session = ready_session();
        let unapproved = ValidationContext { input_allowance: None, ..ctx() };

        let err = session.begin_submission(&unapproved, NOW).unwrap_err();
        assert_eq!(err, TwapError::NotReady("Approve WETH".to_string()));
        assert_eq!(session.state(), &SubmissionState::Idle);
    }

    #[test]
    fn test_complete_without_pending() {
        let mut session = ready_session();
        assert!(session
            .complete_submission(SubmissionOutcome::Confirmed(B256::ZERO))
            .is_err());
    }
}
