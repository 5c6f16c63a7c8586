//! The `plan` command: replays the flags as draft edits, the way a user
//! would fill in the form, then reports the result.

use crate::args::PlanArgs;
use eyre::{eyre, WrapErr};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};
use twap::external::usd_price;
use twap::{
    parse_units, Address, AllowanceLookup, BalanceLookup, Currency, DraftEdit, Field, IntervalMode, OrderSession, Price,
    StaticBalances, StaticOracle, TokenList, TwapConfig, TwapOrderDraft, ValidationContext,
    ValidationReport,
};

pub fn run(args: PlanArgs, tokens: &TokenList) -> eyre::Result<()> {
    let sell = resolve(tokens, &args.sell)?;
    let buy = resolve(tokens, &args.buy)?;
    let config = config(&args)?;
    let now_ms = args.now_ms.unwrap_or_else(now_millis);

    let mut session = OrderSession::new(config);
    for edit in edits(&args, &sell, &buy) {
        debug!("applying {:?}", edit);
        session
            .edit(edit.clone(), now_ms)
            .wrap_err_with(|| format!("rejected {edit:?}"))?;
    }

    let ctx = context(&args, tokens, &sell, session.config().twap_contract)?;
    let report = session.report(&ctx);
    print_draft(session.draft());
    print_report(&report);

    if !report.status.is_ready() {
        return Ok(());
    }
    match session.begin_submission(&ctx, now_ms) {
        Ok(request) => {
            info!("order assembled for {}", request.from);
            println!();
            println!("to:       {}", request.to);
            println!("from:     {}", request.from);
            println!("deadline: {} (unix s)", request.args.deadline);
            println!("delay:    {} s", request.args.delay);
            println!("calldata: {}", request.calldata);
        }
        Err(e) => println!("\nnot assembled: {e}"),
    }
    Ok(())
}

fn resolve(tokens: &TokenList, symbol: &str) -> eyre::Result<Currency> {
    tokens
        .by_symbol(symbol)
        .cloned()
        .ok_or_else(|| eyre!("unknown token {symbol:?}, see `twap-cli tokens`"))
}

fn config(args: &PlanArgs) -> eyre::Result<TwapConfig> {
    let min_chunk_usd = Price::parse(&args.min_chunk_usd).wrap_err("invalid --min-chunk-usd")?;
    let mut config = TwapConfig::default()
        .with_min_interval_ms(args.min_interval_ms)
        .with_min_chunk_usd(min_chunk_usd);
    if let Some(contract) = args.contract {
        config = config.with_twap_contract(contract);
    }
    if let Some(exchange) = args.exchange {
        config = config.with_exchange(exchange);
    }
    Ok(config)
}

fn edits(args: &PlanArgs, sell: &Currency, buy: &Currency) -> Vec<DraftEdit> {
    let mut edits = vec![
        DraftEdit::SelectCurrency { field: Field::Input, currency: sell.clone() },
        DraftEdit::SelectCurrency { field: Field::Output, currency: buy.clone() },
        DraftEdit::TypeInput(args.amount.clone()),
        DraftEdit::SetDuration(args.duration.clone()),
    ];
    if let Some(interval) = &args.interval {
        edits.push(DraftEdit::SetInterval(interval.clone()));
    }
    // manual mode must be on before the chunk size lands to keep the interval
    if args.manual {
        edits.push(DraftEdit::SetIntervalMode(IntervalMode::Manual));
    }
    if let Some(chunk) = &args.chunk_size {
        edits.push(DraftEdit::SetChunkSize(Some(chunk.clone())));
    }
    if let Some(limit) = &args.limit_price {
        edits.push(DraftEdit::SetAllowLimitPrice(true));
        // flip the orientation first so the price is taken as typed
        if args.invert {
            edits.push(DraftEdit::SetInvertLimitPrice(true));
        }
        edits.push(DraftEdit::SetLimitPrice(Some(limit.clone())));
    }
    edits
}

fn context(
    args: &PlanArgs,
    tokens: &TokenList,
    sell: &Currency,
    spender: Address,
) -> eyre::Result<ValidationContext> {
    let mut oracle = StaticOracle::new();
    if let Some(usd) = &args.usd_price {
        oracle = oracle.with_quote(sell.address, usd.clone());
    }

    let mut balances = StaticBalances::new(tokens.clone());
    let (mut input_balance, mut input_allowance) = (None, None);
    if let Some(account) = args.account {
        if let Some(balance) = &args.balance {
            let raw = parse_units(balance, sell.decimals).wrap_err("invalid --balance")?;
            balances = balances.with_balance(account, sell.address, raw);
            input_balance = balances.balance_of(account, sell.address);
        }
        if let Some(allowance) = &args.allowance {
            let raw = parse_units(allowance, sell.decimals).wrap_err("invalid --allowance")?;
            balances = balances.with_allowance(account, spender, sell.address, raw);
            input_allowance = balances.allowance(account, spender, sell.address);
        }
    }

    Ok(ValidationContext {
        account: args.account,
        input_balance,
        input_usd: usd_price(&oracle, sell.address),
        input_allowance,
    })
}

fn print_draft(draft: &TwapOrderDraft) {
    let symbol = |c: &Option<Currency>| c.as_ref().map_or("-".to_string(), |c| c.symbol.clone());
    let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

    println!("sell:       {} {}", draft.typed_value, symbol(&draft.input_currency));
    println!("buy:        {}", symbol(&draft.output_currency));
    println!("duration:   {}", draft.duration);
    println!("interval:   {}", draft.interval);
    println!("chunk size: {}", or_dash(draft.chunk_size.clone()));
    println!("chunks:     {}", or_dash(draft.total_chunks.map(|c| c.to_string())));
    if let Some(limit) = &draft.limit_price {
        let orientation = if draft.invert_limit_price { "input per output" } else { "output per input" };
        println!("limit:      {} ({})", limit.typed, orientation);
    }
    println!("mode:       {:?}", draft.interval_mode);
}

fn print_report(report: &ValidationReport) {
    let amount = |a: &Option<twap::TokenAmount>| a.as_ref().map_or("-".to_string(), |a| a.to_exact());

    println!("min out:    {} per chunk", amount(&report.minimum_amount_out));
    if report.expected_output.is_some() {
        println!("expected:   {}", amount(&report.expected_output));
    }
    if let Some(usd) = &report.input_usd_value {
        println!("value:      ${usd}");
    }
    if report.partial_fill_warning {
        println!("warning:    the last chunk may not execute before the deadline");
    }
    println!("status:     {}", report.status);
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{Cli, Command};
    use crate::tokens::default_tokens;
    use clap::Parser;

    fn plan_args(extra: &[&str]) -> PlanArgs {
        let mut argv = vec![
            "twap-cli", "plan", "--sell", "WETH", "--buy", "USDC", "--amount", "10", "--duration", "1h",
        ];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Plan(args) => args,
            Command::Tokens => unreachable!(),
        }
    }

    #[test]
    fn test_edits_follow_flags() {
        let tokens = default_tokens();
        let args = plan_args(&["--chunk-size", "1", "--limit-price", "0.0005", "--invert"]);
        let sell = resolve(&tokens, &args.sell).unwrap();
        let buy = resolve(&tokens, &args.buy).unwrap();

        let mut session = OrderSession::default();
        for edit in edits(&args, &sell, &buy) {
            session.edit(edit, 0).unwrap();
        }
        let draft = session.draft();
        assert_eq!(draft.total_chunks.map(|c| c.to::<u64>()), Some(10));
        assert!(draft.invert_limit_price);
        assert_eq!(draft.limit_price.as_ref().unwrap().typed, "0.0005");
    }

    #[test]
    fn test_context_reads_balance_and_quote() {
        let tokens = default_tokens();
        let args = plan_args(&[
            "--account",
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "--balance",
            "12.5",
            "--usd-price",
            "1850",
        ]);
        let sell = resolve(&tokens, &args.sell).unwrap();
        let ctx = context(&args, &tokens, &sell, Address::repeat_byte(0xCC)).unwrap();

        assert_eq!(ctx.input_balance.unwrap().to_exact(), "12.5");
        assert_eq!(ctx.input_usd, Some(Price::from_u128(1850, 1)));
        assert_eq!(ctx.input_allowance, None);
    }

    #[test]
    fn test_context_reads_allowance() {
        let tokens = default_tokens();
        let args = plan_args(&["--account", "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "--allowance", "10"]);
        let sell = resolve(&tokens, &args.sell).unwrap();
        let ctx = context(&args, &tokens, &sell, Address::repeat_byte(0xCC)).unwrap();

        assert_eq!(ctx.input_allowance.unwrap().to_exact(), "10");
        assert_eq!(ctx.input_balance, None);
    }

    #[test]
    fn test_manual_keeps_interval_over_chunk_size() {
        let tokens = default_tokens();
        let sell = resolve(&tokens, "WETH").unwrap();
        let buy = resolve(&tokens, "USDC").unwrap();
        let solve = |extra: &[&str]| {
            let mut session = OrderSession::default();
            for edit in edits(&plan_args(extra), &sell, &buy) {
                session.edit(edit, 0).unwrap();
            }
            session.draft().clone()
        };

        let auto = solve(&["--interval", "6m", "--chunk-size", "2"]);
        assert_eq!(auto.interval.millis(), Some(12 * 60_000));

        let manual = solve(&["--interval", "6m", "--chunk-size", "2", "--manual"]);
        assert_eq!(manual.interval.millis(), Some(6 * 60_000));
        assert_eq!(manual.total_chunks.map(|c| c.to::<u64>()), Some(5));
        assert_eq!(manual.interval_mode, IntervalMode::Manual);
    }

    #[test]
    fn test_unknown_token() {
        assert!(resolve(&default_tokens(), "DOGE").is_err());
    }
}
