//! Outbound message formatting. Pure functions, no I/O: the engine decides
//! what happened, these decide how it reads on a phone screen.

use sniper_core::domain::{Signal, Trade, TradeStatus, Trend};
use sniper_core::indicators::IndicatorSnapshot;
use sniper_core::stats::StatsReport;

pub fn help() -> String {
    "Sniper bot connected!\n\n\
     Available commands:\n\
     /analyse - force an analysis now\n\
     /status - current indicators and open trade\n\
     /stats - paper-trade statistics\n\n\
     The market is analysed automatically on a schedule;\n\
     you will receive a report after every analysis."
        .to_string()
}

pub fn startup(symbol: &str, interval: &str, analysis_interval_secs: u64) -> String {
    format!(
        "Bot started!\n\nWatching {symbol} ({interval} candles), analysing every {} min.\nFirst analysis in progress...",
        analysis_interval_secs / 60
    )
}

pub fn data_error(error: &str) -> String {
    format!("Market data unavailable: {error}\nCycle skipped; will retry on the next schedule.")
}

pub fn no_signal(price: f64, trend: Trend, rsi: f64, adx: f64, volume_ok: bool) -> String {
    format!(
        "Analysis complete\n\n\
         Price: ${price:.2}\n\
         Trend: {trend}\n\
         RSI: {rsi:.2} | ADX: {adx:.2}\n\
         Volume OK: {}\n\n\
         Signal: NONE - waiting...",
        yes_no(volume_ok)
    )
}

pub fn cooldown_suppressed(signal: &Signal, remaining_secs: i64) -> String {
    format!(
        "Signal {} detected but suppressed by cooldown\n({remaining_secs}s remaining). Use /analyse to force.",
        signal.verdict
    )
}

pub fn advisory_rejected(signal: &Signal, score: u8, min_score: u8, rationale: &str) -> String {
    format!(
        "Analysis complete\n\n\
         Price: ${:.2}\n\
         Signal detected: {}\n\
         Advisory score: {score}/100 (minimum: {min_score})\n\
         Reason: {rationale}\n\n\
         Action: WAIT",
        signal.entry, signal.verdict
    )
}

pub fn advisory_unavailable(signal: &Signal, error: &str) -> String {
    format!(
        "Advisory scorer unavailable ({error});\nproceeding on engine strength {}/100 for signal {}.",
        signal.strength, signal.verdict
    )
}

pub fn signal_validated(signal: &Signal, score: Option<u8>, advisory_rationale: Option<&str>) -> String {
    let entry = signal.entry;
    let tp_pct = level_pct(signal.take_profit, entry);
    let sl_pct = level_pct(signal.stop_loss, entry);
    let mut msg = format!(
        "SIGNAL DETECTED!\n\n\
         Type: {}\n\
         Entry: ${entry:.2}\n\
         TP: ${:.2} ({tp_pct:+.2}%)\n\
         SL: ${:.2} ({sl_pct:+.2}%)\n\n\
         Strength: {}/100\n",
        signal.verdict, signal.take_profit, signal.stop_loss, signal.strength
    );
    if let Some(score) = score {
        msg.push_str(&format!("Advisory score: {score}/100\n"));
    }
    if let Some(rationale) = advisory_rationale {
        msg.push_str(&format!("Advisory: {rationale}\n"));
    }
    msg.push_str(&format!("\nSetup: {}", signal.rationale));
    msg
}

pub fn trade_opened(trade: &Trade) -> String {
    format!(
        "Paper trade #{} opened: {} @ ${:.2}\nSL ${:.2} / TP ${:.2}",
        trade.id, trade.direction, trade.entry, trade.stop_loss, trade.take_profit
    )
}

pub fn trade_closed(trade: &Trade) -> String {
    let outcome = match trade.status {
        TradeStatus::Win => "WIN",
        TradeStatus::Loss => "LOSS",
        TradeStatus::Open => "OPEN",
    };
    format!(
        "Trade #{} closed: {outcome}\n\n\
         Entry: ${:.2}\n\
         Exit: ${:.2}\n\
         P&L: {:+.2}%\n\
         Balance: ${:.2}",
        trade.id,
        trade.entry,
        trade.close_price.unwrap_or(trade.entry),
        trade.pnl_pct.unwrap_or(0.0),
        trade.balance_after.unwrap_or(0.0)
    )
}

pub fn position_already_open(signal: &Signal, open_id: u64) -> String {
    format!(
        "Signal {} detected but trade #{open_id} is still open.\nSingle-position policy: no new trade.",
        signal.verdict
    )
}

pub fn status(
    price: f64,
    snapshot: &IndicatorSnapshot,
    volume_ok: bool,
    open: Option<&Trade>,
) -> String {
    let mut msg = format!(
        "Bot status\n\n\
         Price: ${price:.2}\n\
         RSI: {:.2}\n\
         ADX: {:.2}\n\
         EMA200: ${:.2}\n\
         ATR: ${:.2}\n\
         Volume OK: {}",
        snapshot.rsi, snapshot.adx, snapshot.ema_trend, snapshot.atr,
        yes_no(volume_ok)
    );
    match open {
        Some(trade) => msg.push_str(&format!(
            "\n\nOpen trade #{}: {} @ ${:.2} (SL ${:.2} / TP ${:.2})",
            trade.id, trade.direction, trade.entry, trade.stop_loss, trade.take_profit
        )),
        None => msg.push_str("\n\nNo open trade"),
    }
    msg
}

pub fn stats(report: Option<&StatsReport>) -> String {
    let Some(report) = report else {
        return "No closed trades yet.".to_string();
    };
    format!(
        "Paper-trade stats\n\n\
         Trades: {} ({} wins / {} losses)\n\
         Win rate: {:.2}%\n\
         Total P&L: {:+.2}%\n\
         Balance: ${:.2} ({:+.2}%)",
        report.total,
        report.wins,
        report.losses,
        report.win_rate,
        report.total_pnl_pct,
        report.balance,
        report.growth_pct
    )
}

fn level_pct(level: f64, entry: f64) -> f64 {
    if entry > 0.0 {
        (level - entry) / entry * 100.0
    } else {
        0.0
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
