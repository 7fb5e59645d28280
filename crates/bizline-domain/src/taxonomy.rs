//! Taxonomy module - the fixed set of financial-services business lines

use std::fmt;

/// A business-line label from the taxonomy
///
/// Labels are static data: the name is the exact string a classifier must
/// emit, the description is prompt material for the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label {
    name: &'static str,
    description: &'static str,
}

impl Label {
    const fn new(name: &'static str, description: &'static str) -> Self {
        Self { name, description }
    }

    /// The label identifier, exactly as a classifier must return it
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Human-readable description of the business line
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Look up a label by its exact name
    ///
    /// No case folding or fuzzy matching is applied.
    ///
    /// # Examples
    ///
    /// ```
    /// use bizline_domain::Label;
    ///
    /// assert!(Label::parse("Research - FI research").is_some());
    /// assert!(Label::parse("research - fi research").is_none());
    /// ```
    pub fn parse(name: &str) -> Option<Label> {
        TAXONOMY.iter().copied().find(|label| label.name == name)
    }

    /// Check whether a string is a member of the taxonomy
    pub fn is_known(name: &str) -> bool {
        Self::parse(name).is_some()
    }

    /// Iterate over all labels in taxonomy order
    pub fn all() -> impl Iterator<Item = Label> {
        TAXONOMY.iter().copied()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The complete taxonomy, in presentation order
pub static TAXONOMY: [Label; 23] = [
    Label::new(
        "Investment Banking - Mergers & Acquisitions (M&A)",
        "Advises companies on buying, selling, or merging with other businesses. Works on leveraged buyouts (LBOs), hostile takeovers, and strategic deals.",
    ),
    Label::new(
        "Investment Banking - Capital Markets (ECM&DCM)",
        "Equity Capital Markets (ECM): Helps companies raise capital through IPOs, follow-on offerings, and private placements. Debt Capital Markets (DCM): Assists in issuing corporate bonds, government debt, and structured financing.",
    ),
    Label::new(
        "Global Markets (including Sales & Trading) - Equities",
        "Deals with stocks, ETFs, and equity derivatives.",
    ),
    Label::new(
        "Global Markets (including Sales & Trading) - FICC",
        "Covers bonds, interest rate products, FX, and commodities.",
    ),
    Label::new(
        "Global Markets (including Sales & Trading) - Structured Products",
        "Creates complex financial instruments like derivatives, swaps, and securitized products.",
    ),
    Label::new(
        "Global Markets (including Sales & Trading) - Prime Brokerage",
        "Services for hedge funds (leverage, securities lending, execution).",
    ),
    Label::new(
        "Securities Services - Custody / funding services",
        "Provides custody, clearing, settlement, and asset-servicing solutions to institutional clients.",
    ),
    Label::new(
        "Research - Equity research",
        "Covers public companies, earnings forecasts, and stock recommendations.",
    ),
    Label::new(
        "Research - FI research",
        "Analyzes bonds, credit risk, and macroeconomic trends.",
    ),
    Label::new(
        "Commercial Banking - Core Lending & Credit Solutions",
        "Business loans, credit facilities, and small business banking.",
    ),
    Label::new(
        "Commercial Banking - Deposit & Cash Management (Treasury)",
        "Responsible for cash management, liquidity, and treasury functions.",
    ),
    Label::new(
        "Commercial Banking - Payment & Merchant Services",
        "Business Credit/Debit Cards – Corporate cards, purchasing cards (P-cards). Merchant Acquiring – Payment processing for retailers (POS, e-commerce). B2B Payments – Automated vendor payments, virtual cards.",
    ),
    Label::new(
        "Commercial Banking - Trade & Supply Chain Finance",
        "Import/Export Financing – Letters of credit, documentary collections. Supply Chain Finance – Early payment programs for suppliers. Foreign Exchange (FX) Services – Hedging against currency risk.",
    ),
    Label::new(
        "Retail banking - Core retail banking products",
        "Deposit accounts, Lending products, payment services.",
    ),
    Label::new(
        "Retail banking - Wealth & investment services",
        "Basic investment products and advisory services.",
    ),
    Label::new(
        "Retail banking - Digital & Mobile Banking",
        "Mobile apps, AI chatbots.",
    ),
    Label::new(
        "Private Banking - Private wealth",
        "Manages investments for high-net-worth individuals (HNWIs), families, and institutions.",
    ),
    Label::new(
        "Business services - Bank level support functions",
        "Bank level risk, finance, IT, and others.",
    ),
    Label::new(
        "Asset Management - Hedge fund",
        "A type of investment fund that uses high-risk strategies to generate returns for its investors.",
    ),
    Label::new(
        "Asset Management - Mutual fund",
        "A pooled investment fund that collects money from many investors to invest in a diversified portfolio of stocks, bonds, or other assets.",
    ),
    Label::new(
        "Asset Management - Private Equity (PE)",
        "Investment in private companies or buyouts of public companies, typically aiming to improve them and eventually sell them at a profit.",
    ),
    Label::new(
        "Insurance - Core insurance products",
        "Life insurance, health insurance, and others.",
    ),
    Label::new(
        "Insurance - Value added services",
        "Risk Assessment & Consulting, Claims Management.",
    ),
];
