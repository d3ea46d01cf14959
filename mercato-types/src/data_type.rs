use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::MercatoError;

/// Categories of financial data a caller can request.
///
/// This is the closed set of capabilities a connector may declare; a
/// `(platform, data type)` pair outside of what a connector declares is an
/// `UnknownCapability` at dispatch time, never a silent miss.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DataType {
    /// Daily/periodic price bars for a single stock.
    StockData,
    /// Financial statements (income, balance sheet, cash flow) as a report.
    FinancialData,
    /// Derived financial ratios and indicators.
    FinancialIndicators,
    /// News articles related to a symbol or query.
    News,
    /// Technical indicators (MA, MACD, RSI, ...).
    TechnicalIndicators,
    /// Market-wide or sector data.
    MarketData,
    /// Macroeconomic series (GDP, CPI, ...).
    MacroData,
    /// Sentiment analysis over news/social feeds.
    Sentiment,
    /// Backtest helpers exposed by a platform.
    Backtest,

    /// Basic company information.
    StockInfo,
    /// Currently popular stocks.
    HotStocks,
    /// Constituents of an industry.
    IndustryStocks,
    /// Index price bars.
    IndexData,
    /// Factor exposures.
    FactorData,
    /// Insider sentiment aggregates.
    InsiderSentiment,
    /// Insider transaction listings.
    InsiderTransactions,
    /// Balance sheet statements.
    BalanceSheet,
    /// Cash flow statements.
    Cashflow,
    /// Income statements.
    IncomeStatement,
    /// Global (non symbol specific) news.
    GlobalNews,
    /// Company-specific news from community sources.
    CompanyNews,
}

impl DataType {
    /// Every data type, in declaration order.
    pub const ALL: &'static [Self] = &[
        Self::StockData,
        Self::FinancialData,
        Self::FinancialIndicators,
        Self::News,
        Self::TechnicalIndicators,
        Self::MarketData,
        Self::MacroData,
        Self::Sentiment,
        Self::Backtest,
        Self::StockInfo,
        Self::HotStocks,
        Self::IndustryStocks,
        Self::IndexData,
        Self::FactorData,
        Self::InsiderSentiment,
        Self::InsiderTransactions,
        Self::BalanceSheet,
        Self::Cashflow,
        Self::IncomeStatement,
        Self::GlobalNews,
        Self::CompanyNews,
    ];

    /// Stable, snake_case identifier used in configuration documents and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StockData => "stock_data",
            Self::FinancialData => "financial_data",
            Self::FinancialIndicators => "financial_indicators",
            Self::News => "news",
            Self::TechnicalIndicators => "technical_indicators",
            Self::MarketData => "market_data",
            Self::MacroData => "macro_data",
            Self::Sentiment => "sentiment",
            Self::Backtest => "backtest",
            Self::StockInfo => "stock_info",
            Self::HotStocks => "hot_stocks",
            Self::IndustryStocks => "industry_stocks",
            Self::IndexData => "index_data",
            Self::FactorData => "factor_data",
            Self::InsiderSentiment => "insider_sentiment",
            Self::InsiderTransactions => "insider_transactions",
            Self::BalanceSheet => "balance_sheet",
            Self::Cashflow => "cashflow",
            Self::IncomeStatement => "income_statement",
            Self::GlobalNews => "global_news",
            Self::CompanyNews => "company_news",
        }
    }

    /// Short human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::StockData => "stock price bars",
            Self::FinancialData => "financial statements",
            Self::FinancialIndicators => "financial indicators",
            Self::News => "news",
            Self::TechnicalIndicators => "technical indicators",
            Self::MarketData => "market data",
            Self::MacroData => "macroeconomic data",
            Self::Sentiment => "sentiment analysis",
            Self::Backtest => "backtesting",
            Self::StockInfo => "company information",
            Self::HotStocks => "popular stocks",
            Self::IndustryStocks => "industry constituents",
            Self::IndexData => "index price bars",
            Self::FactorData => "factor exposures",
            Self::InsiderSentiment => "insider sentiment",
            Self::InsiderTransactions => "insider transactions",
            Self::BalanceSheet => "balance sheet",
            Self::Cashflow => "cash flow statement",
            Self::IncomeStatement => "income statement",
            Self::GlobalNews => "global news",
            Self::CompanyNews => "company news",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = MercatoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|dt| dt.as_str() == s)
            .ok_or_else(|| MercatoError::InvalidArg(format!("unknown data type: {s}")))
    }
}
