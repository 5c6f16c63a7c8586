//! Order assembly: turns a solved draft into the TWAP contract's `ask` call.
//!
//! Assembly is pure. It checks the draft field by field, stopping at the
//! first missing one, and produces both the typed arguments and the
//! ABI-encoded calldata. Sending the call is up to the caller.

use crate::config::TwapConfig;
use crate::draft::TwapOrderDraft;
use crate::error::AssemblyError;
use crate::pricing::minimum_amount_out;
use crate::types::{Address, Amount, Bytes};
use alloy::sol;
use alloy::sol_types::SolCall;
use tracing::debug;

sol! {
    /// On-chain TWAP order book.
    #[derive(Debug, PartialEq, Eq)]
    interface ITwap {
        function ask(
            address exchange,
            address srcToken,
            address dstToken,
            uint256 srcAmount,
            uint256 srcBidAmount,
            uint256 dstMinAmount,
            uint32 deadline,
            uint32 delay
        ) external returns (uint64 id);
    }
}

pub const ASK_SELECTOR: [u8; 4] = ITwap::askCall::SELECTOR;

/// Arguments of `ask`, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskArgs {
    /// Exchange each chunk is routed through.
    pub exchange: Address,
    pub src_token: Address,
    pub dst_token: Address,
    /// Total input, base units.
    pub src_amount: Amount,
    /// Input per chunk, base units.
    pub src_bid_amount: Amount,
    /// Minimum output per chunk, base units.
    pub dst_min_amount: Amount,
    /// Expiry, unix seconds.
    pub deadline: u32,
    /// Seconds between chunks.
    pub delay: u32,
}

impl AskArgs {
    pub fn to_call(&self) -> ITwap::askCall {
        ITwap::askCall {
            exchange: self.exchange,
            srcToken: self.src_token,
            dstToken: self.dst_token,
            srcAmount: self.src_amount,
            srcBidAmount: self.src_bid_amount,
            dstMinAmount: self.dst_min_amount,
            deadline: self.deadline,
            delay: self.delay,
        }
    }

    /// Encode these arguments as `ask` calldata.
    pub fn encode_calldata(&self) -> Bytes {
        self.to_call().abi_encode().into()
    }
}

/// A ready-to-send order: who sends it, where, and with what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub from: Address,
    /// The TWAP contract.
    pub to: Address,
    pub args: AskArgs,
    pub calldata: Bytes,
}

/// Builds [`OrderRequest`]s from drafts.
#[derive(Debug, Clone, Default)]
pub struct OrderAssembler {
    config: TwapConfig,
}

impl OrderAssembler {
    pub fn new(config: TwapConfig) -> Self {
        Self { config }
    }

    /// Assemble the `ask` call for `draft` on behalf of `account`.
    pub fn assemble(
        &self,
        draft: &TwapOrderDraft,
        account: Option<Address>,
    ) -> Result<OrderRequest, AssemblyError> {
        let (Some(input), Some(output)) = (&draft.input_currency, &draft.output_currency) else {
            return Err(AssemblyError::MissingCurrencies);
        };
        if input.is_native() {
            return Err(AssemblyError::NativeInput);
        }
        if self.config.twap_contract == Address::ZERO {
            return Err(AssemblyError::MissingContract);
        }
        let account = account.ok_or(AssemblyError::MissingAccount)?;
        let deadline_ms = draft.deadline.ok_or(AssemblyError::MissingDeadline)?;
        let interval_ms = draft.interval.millis().ok_or(AssemblyError::MissingInterval)?;
        let src_bid_amount = draft.chunk_amount().ok_or(AssemblyError::MissingChunkSize)?;
        let src_amount = draft.input_amount().ok_or(AssemblyError::MissingInputAmount)?;

        let limit = match (draft.allow_limit_price, draft.effective_limit_price()) {
            (true, None) => return Err(AssemblyError::MissingMinimumAmountOut),
            (_, limit) => limit,
        };
        let dst_min_amount = minimum_amount_out(
            src_bid_amount,
            input.decimals,
            limit,
            draft.invert_limit_price,
            output.decimals,
        )
        .ok_or(AssemblyError::MissingMinimumAmountOut)?;

        let deadline = u32::try_from(deadline_ms.saturating_add(self.config.deadline_grace_ms) / 1000)
            .map_err(|_| AssemblyError::OutOfRange("deadline"))?;
        // delay is whole seconds and must be non-zero
        if interval_ms < 1000 {
            return Err(AssemblyError::OutOfRange("interval"));
        }
        let delay = u32::try_from(interval_ms / 1000).map_err(|_| AssemblyError::OutOfRange("interval"))?;

        let args = AskArgs {
            exchange: self.config.exchange,
            src_token: input.address,
            dst_token: output.address,
            src_amount,
            src_bid_amount,
            dst_min_amount,
            deadline,
            delay,
        };
        debug!(
            "assembled ask: {} {} -> {} in chunks of {}, every {}s until {}",
            args.src_amount, input.symbol, output.symbol, args.src_bid_amount, args.delay, args.deadline
        );

        Ok(OrderRequest {
            from: account,
            to: self.config.twap_contract,
            calldata: args.encode_calldata(),
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::parse_units;
    use crate::draft::LimitPrice;
    use crate::time::{TimeUnit, TimeValue, MINUTE_MS};
    use crate::types::{Currency, Price, U256};

    const DEADLINE_MS: u64 = 1_700_000_000_000;

    fn contract() -> Address {
        Address::repeat_byte(0xCC)
    }

    fn alice() -> Address {
        Address::repeat_byte(0xA1)
    }

    fn weth() -> Currency {
        Currency::token(Address::repeat_byte(0x01), 18, "WETH")
    }

    fn usdc() -> Currency {
        Currency::token(Address::repeat_byte(0x02), 6, "USDC")
    }

    fn assembler() -> OrderAssembler {
        OrderAssembler::new(TwapConfig::default().with_twap_contract(contract()))
    }

    /// 100 WETH in chunks of 10, every 6 minutes.
    fn solved_draft() -> TwapOrderDraft {
        TwapOrderDraft {
            input_currency: Some(weth()),
            output_currency: Some(usdc()),
            typed_value: "100".to_string(),
            duration: TimeValue::typed(TimeUnit::Hours, "1"),
            interval: TimeValue::typed(TimeUnit::Minutes, "6"),
            chunk_size: Some("10".to_string()),
            total_chunks: Some(U256::from(10u64)),
            deadline: Some(DEADLINE_MS),
            ..Default::default()
        }
    }

    #[test]
    fn test_assemble_market_order() {
        let request = assembler().assemble(&solved_draft(), Some(alice())).unwrap();

        assert_eq!(request.from, alice());
        assert_eq!(request.to, contract());
        assert_eq!(
            request.args,
            AskArgs {
                exchange: crate::config::DEFAULT_EXCHANGE,
                src_token: weth().address,
                dst_token: usdc().address,
                src_amount: parse_units("100", 18).unwrap(),
                src_bid_amount: parse_units("10", 18).unwrap(),
                dst_min_amount: U256::from(1u64),
                deadline: ((DEADLINE_MS + MINUTE_MS) / 1000) as u32,
                delay: 360,
            }
        );
    }

    #[test]
    fn test_calldata_round_trip() {
        let request = assembler().assemble(&solved_draft(), Some(alice())).unwrap();

        assert_eq!(&request.calldata[..4], &ASK_SELECTOR);
        assert_eq!(request.calldata.len(), 4 + 8 * 32);

        let decoded = ITwap::askCall::abi_decode(&request.calldata).unwrap();
        assert_eq!(decoded, request.args.to_call());
    }

    #[test]
    fn test_assemble_with_limit_price() {
        let mut draft = solved_draft();
        draft.allow_limit_price = true;
        draft.limit_price = Some(LimitPrice {
            typed: "1800".to_string(),
            price: Price::from_u128(1800, 1),
        });

        let request = assembler().assemble(&draft, Some(alice())).unwrap();
        assert_eq!(request.args.dst_min_amount, parse_units("18000", 6).unwrap());
    }

    #[test]
    fn test_limit_enabled_without_price() {
        let mut draft = solved_draft();
        draft.allow_limit_price = true;
        assert_eq!(
            assembler().assemble(&draft, Some(alice())),
            Err(AssemblyError::MissingMinimumAmountOut)
        );
    }

    #[test]
    fn test_missing_fields_in_order() {
        let assembler = assembler();

        let mut draft = solved_draft();
        draft.output_currency = None;
        assert_eq!(assembler.assemble(&draft, Some(alice())), Err(AssemblyError::MissingCurrencies));

        let no_contract = OrderAssembler::default();
        assert_eq!(
            no_contract.assemble(&solved_draft(), Some(alice())),
            Err(AssemblyError::MissingContract)
        );

        assert_eq!(assembler.assemble(&solved_draft(), None), Err(AssemblyError::MissingAccount));

        // deadline is checked before the interval
        let mut draft = solved_draft();
        draft.deadline = None;
        draft.interval = TimeValue::empty(TimeUnit::Minutes);
        assert_eq!(assembler.assemble(&draft, Some(alice())), Err(AssemblyError::MissingDeadline));

        let mut draft = solved_draft();
        draft.interval = TimeValue::empty(TimeUnit::Minutes);
        assert_eq!(assembler.assemble(&draft, Some(alice())), Err(AssemblyError::MissingInterval));

        let mut draft = solved_draft();
        draft.chunk_size = None;
        draft.typed_value.clear();
        assert_eq!(assembler.assemble(&draft, Some(alice())), Err(AssemblyError::MissingChunkSize));

        let mut draft = solved_draft();
        draft.typed_value.clear();
        assert_eq!(assembler.assemble(&draft, Some(alice())), Err(AssemblyError::MissingInputAmount));
    }

    #[test]
    fn test_native_input_rejected() {
        let mut draft = solved_draft();
        draft.input_currency = Some(Currency::native(18, "ETH"));
        assert_eq!(assembler().assemble(&draft, Some(alice())), Err(AssemblyError::NativeInput));
    }

    #[test]
    fn test_deadline_out_of_range() {
        let mut draft = solved_draft();
        draft.deadline = Some(u64::MAX);
        assert_eq!(
            assembler().assemble(&draft, Some(alice())),
            Err(AssemblyError::OutOfRange("deadline"))
        );
    }

    #[test]
    fn test_sub_second_interval_out_of_range() {
        let mut draft = solved_draft();
        draft.interval.milliseconds = Some(60);
        assert_eq!(
            assembler().assemble(&draft, Some(alice())),
            Err(AssemblyError::OutOfRange("interval"))
        );

        draft.interval.milliseconds = Some(1000);
        let request = assembler().assemble(&draft, Some(alice())).unwrap();
        assert_eq!(request.args.delay, 1);
    }
}
