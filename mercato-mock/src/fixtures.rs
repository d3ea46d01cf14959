//! Deterministic payloads shaped like what real providers return.

/// Daily bars with a `date,open,high,low,close,volume` header and `rows` data lines.
#[must_use]
pub fn stock_report(symbol: &str, rows: usize) -> String {
    let mut out = format!("# {symbol} daily bars\ndate,open,high,low,close,volume\n");
    for i in 0..rows {
        let open = 10.0 + i as f64 * 0.1;
        out.push_str(&format!(
            "2024-01-{:02},{open:.2},{:.2},{:.2},{:.2},{}\n",
            i % 28 + 1,
            open + 0.5,
            open - 0.3,
            open + 0.2,
            100_000 + i * 250
        ));
    }
    out
}

/// Annual statement summary containing a `period` column.
#[must_use]
pub fn financial_report(symbol: &str) -> String {
    format!(
        "# {symbol} financial summary\n\
         period,revenue,net_income,eps\n\
         2023,1200000000,150000000,1.52\n\
         2022,1100000000,132000000,1.34\n"
    )
}

/// `n` headline lines.
#[must_use]
pub fn news(symbol: &str, n: usize) -> String {
    (1..=n)
        .map(|i| format!("[{i}] {symbol}: headline number {i}\n"))
        .collect()
}

/// The message Chinese providers return when a lookup finds nothing.
#[must_use]
pub fn not_obtained(symbol: &str) -> String {
    format!("未获取到{symbol}的股票数据")
}
