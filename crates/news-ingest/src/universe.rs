//! The closed set of NSE stocks the pipeline tracks, with the aliases used for
//! entity resolution and the sectors used for sector-level alpha.

use signal_core::TrackedStock;

#[derive(Debug, Clone, Copy)]
pub struct UniverseEntry {
    pub ticker: &'static str,
    pub company_name: &'static str,
    pub sector: &'static str,
    pub aliases: &'static [&'static str],
}

/// Sectors that get their own alpha snapshot each cycle.
pub const TRACKED_SECTORS: &[&str] = &[
    "Banking & Finance",
    "Information Technology",
    "Oil & Gas",
    "Pharmaceuticals",
    "Automobiles",
    "FMCG",
    "Metals & Mining",
    "Telecom",
    "Infrastructure",
    "Real Estate",
];

pub const TRACKED_UNIVERSE: &[UniverseEntry] = &[
    UniverseEntry {
        ticker: "RELIANCE",
        company_name: "Reliance Industries Ltd",
        sector: "Oil & Gas",
        aliases: &["Reliance", "RIL", "Reliance Industries"],
    },
    UniverseEntry {
        ticker: "TCS",
        company_name: "Tata Consultancy Services Ltd",
        sector: "Information Technology",
        aliases: &["TCS", "Tata Consultancy", "Tata Consultancy Services"],
    },
    UniverseEntry {
        ticker: "INFY",
        company_name: "Infosys Ltd",
        sector: "Information Technology",
        aliases: &["Infosys", "Infy"],
    },
    UniverseEntry {
        ticker: "HDFCBANK",
        company_name: "HDFC Bank Ltd",
        sector: "Banking & Finance",
        aliases: &["HDFC Bank", "HDFC"],
    },
    UniverseEntry {
        ticker: "ICICIBANK",
        company_name: "ICICI Bank Ltd",
        sector: "Banking & Finance",
        aliases: &["ICICI Bank", "ICICI"],
    },
    UniverseEntry {
        ticker: "HINDUNILVR",
        company_name: "Hindustan Unilever Ltd",
        sector: "FMCG",
        aliases: &["Hindustan Unilever", "HUL"],
    },
    UniverseEntry {
        ticker: "ITC",
        company_name: "ITC Ltd",
        sector: "FMCG",
        aliases: &["ITC", "ITC Limited"],
    },
    UniverseEntry {
        ticker: "SBIN",
        company_name: "State Bank of India",
        sector: "Banking & Finance",
        aliases: &["SBI", "State Bank of India", "State Bank"],
    },
    UniverseEntry {
        ticker: "BHARTIARTL",
        company_name: "Bharti Airtel Ltd",
        sector: "Telecom",
        aliases: &["Bharti Airtel", "Airtel"],
    },
    UniverseEntry {
        ticker: "KOTAKBANK",
        company_name: "Kotak Mahindra Bank Ltd",
        sector: "Banking & Finance",
        aliases: &["Kotak Mahindra Bank", "Kotak Bank", "Kotak"],
    },
    UniverseEntry {
        ticker: "LT",
        company_name: "Larsen & Toubro Ltd",
        sector: "Infrastructure",
        aliases: &["Larsen & Toubro", "L&T", "Larsen and Toubro"],
    },
    UniverseEntry {
        ticker: "AXISBANK",
        company_name: "Axis Bank Ltd",
        sector: "Banking & Finance",
        aliases: &["Axis Bank", "Axis"],
    },
    UniverseEntry {
        ticker: "ASIANPAINT",
        company_name: "Asian Paints Ltd",
        sector: "FMCG",
        aliases: &["Asian Paints", "Asian Paint"],
    },
    UniverseEntry {
        ticker: "MARUTI",
        company_name: "Maruti Suzuki India Ltd",
        sector: "Automobiles",
        aliases: &["Maruti Suzuki", "Maruti"],
    },
    UniverseEntry {
        ticker: "HCLTECH",
        company_name: "HCL Technologies Ltd",
        sector: "Information Technology",
        aliases: &["HCL Technologies", "HCL Tech", "HCL"],
    },
    UniverseEntry {
        ticker: "SUNPHARMA",
        company_name: "Sun Pharmaceutical Industries Ltd",
        sector: "Pharmaceuticals",
        aliases: &["Sun Pharma", "Sun Pharmaceutical"],
    },
    UniverseEntry {
        ticker: "TATAMOTORS",
        company_name: "Tata Motors Ltd",
        sector: "Automobiles",
        aliases: &["Tata Motors", "Tata Motor"],
    },
    UniverseEntry {
        ticker: "BAJFINANCE",
        company_name: "Bajaj Finance Ltd",
        sector: "Banking & Finance",
        aliases: &["Bajaj Finance", "Bajaj Fin"],
    },
    UniverseEntry {
        ticker: "WIPRO",
        company_name: "Wipro Ltd",
        sector: "Information Technology",
        aliases: &["Wipro"],
    },
    UniverseEntry {
        ticker: "ULTRACEMCO",
        company_name: "UltraTech Cement Ltd",
        sector: "Cement",
        aliases: &["UltraTech Cement", "UltraTech"],
    },
    UniverseEntry {
        ticker: "ONGC",
        company_name: "Oil & Natural Gas Corporation Ltd",
        sector: "Oil & Gas",
        aliases: &["ONGC", "Oil and Natural Gas"],
    },
    UniverseEntry {
        ticker: "NTPC",
        company_name: "NTPC Ltd",
        sector: "Power & Energy",
        aliases: &["NTPC"],
    },
    UniverseEntry {
        ticker: "POWERGRID",
        company_name: "Power Grid Corporation of India Ltd",
        sector: "Power & Energy",
        aliases: &["Power Grid", "Power Grid Corporation"],
    },
    UniverseEntry {
        ticker: "TITAN",
        company_name: "Titan Company Ltd",
        sector: "FMCG",
        aliases: &["Titan", "Titan Company"],
    },
    UniverseEntry {
        ticker: "ADANIENT",
        company_name: "Adani Enterprises Ltd",
        sector: "Infrastructure",
        aliases: &["Adani Enterprises", "Adani"],
    },
    UniverseEntry {
        ticker: "ADANIPORTS",
        company_name: "Adani Ports & SEZ Ltd",
        sector: "Infrastructure",
        aliases: &["Adani Ports", "Adani Ports and SEZ"],
    },
    UniverseEntry {
        ticker: "TECHM",
        company_name: "Tech Mahindra Ltd",
        sector: "Information Technology",
        aliases: &["Tech Mahindra", "TechM"],
    },
    UniverseEntry {
        ticker: "TATASTEEL",
        company_name: "Tata Steel Ltd",
        sector: "Metals & Mining",
        aliases: &["Tata Steel"],
    },
    UniverseEntry {
        ticker: "NESTLEIND",
        company_name: "Nestle India Ltd",
        sector: "FMCG",
        aliases: &["Nestle India", "Nestle"],
    },
    UniverseEntry {
        ticker: "BAJAJFINSV",
        company_name: "Bajaj Finserv Ltd",
        sector: "Banking & Finance",
        aliases: &["Bajaj Finserv"],
    },
    UniverseEntry {
        ticker: "JSWSTEEL",
        company_name: "JSW Steel Ltd",
        sector: "Metals & Mining",
        aliases: &["JSW Steel", "JSW"],
    },
    UniverseEntry {
        ticker: "INDUSINDBK",
        company_name: "IndusInd Bank Ltd",
        sector: "Banking & Finance",
        aliases: &["IndusInd Bank", "IndusInd"],
    },
    UniverseEntry {
        ticker: "DIVISLAB",
        company_name: "Divi's Laboratories Ltd",
        sector: "Pharmaceuticals",
        aliases: &["Divi's Laboratories", "Divi's Lab", "Divis Lab"],
    },
    UniverseEntry {
        ticker: "GRASIM",
        company_name: "Grasim Industries Ltd",
        sector: "Cement",
        aliases: &["Grasim", "Grasim Industries"],
    },
    UniverseEntry {
        ticker: "DRREDDY",
        company_name: "Dr. Reddy's Laboratories Ltd",
        sector: "Pharmaceuticals",
        aliases: &["Dr. Reddy's", "Dr Reddy", "Dr. Reddy's Laboratories"],
    },
    UniverseEntry {
        ticker: "CIPLA",
        company_name: "Cipla Ltd",
        sector: "Pharmaceuticals",
        aliases: &["Cipla"],
    },
    UniverseEntry {
        ticker: "EICHERMOT",
        company_name: "Eicher Motors Ltd",
        sector: "Automobiles",
        aliases: &["Eicher Motors", "Royal Enfield"],
    },
    UniverseEntry {
        ticker: "APOLLOHOSP",
        company_name: "Apollo Hospitals Enterprise Ltd",
        sector: "Pharmaceuticals",
        aliases: &["Apollo Hospitals", "Apollo"],
    },
    UniverseEntry {
        ticker: "COALINDIA",
        company_name: "Coal India Ltd",
        sector: "Metals & Mining",
        aliases: &["Coal India", "CIL"],
    },
    UniverseEntry {
        ticker: "BPCL",
        company_name: "Bharat Petroleum Corporation Ltd",
        sector: "Oil & Gas",
        aliases: &["BPCL", "Bharat Petroleum"],
    },
    UniverseEntry {
        ticker: "HEROMOTOCO",
        company_name: "Hero MotoCorp Ltd",
        sector: "Automobiles",
        aliases: &["Hero MotoCorp", "Hero"],
    },
    UniverseEntry {
        ticker: "BRITANNIA",
        company_name: "Britannia Industries Ltd",
        sector: "FMCG",
        aliases: &["Britannia", "Britannia Industries"],
    },
    UniverseEntry {
        ticker: "HINDALCO",
        company_name: "Hindalco Industries Ltd",
        sector: "Metals & Mining",
        aliases: &["Hindalco", "Hindalco Industries"],
    },
    UniverseEntry {
        ticker: "SBILIFE",
        company_name: "SBI Life Insurance Co Ltd",
        sector: "Banking & Finance",
        aliases: &["SBI Life", "SBI Life Insurance"],
    },
    UniverseEntry {
        ticker: "BAJAJ-AUTO",
        company_name: "Bajaj Auto Ltd",
        sector: "Automobiles",
        aliases: &["Bajaj Auto"],
    },
    UniverseEntry {
        ticker: "TATACONSUM",
        company_name: "Tata Consumer Products Ltd",
        sector: "FMCG",
        aliases: &["Tata Consumer", "Tata Consumer Products"],
    },
    UniverseEntry {
        ticker: "M&M",
        company_name: "Mahindra & Mahindra Ltd",
        sector: "Automobiles",
        aliases: &["Mahindra & Mahindra", "M&M", "Mahindra"],
    },
    UniverseEntry {
        ticker: "HDFCLIFE",
        company_name: "HDFC Life Insurance Co Ltd",
        sector: "Banking & Finance",
        aliases: &["HDFC Life", "HDFC Life Insurance"],
    },
    UniverseEntry {
        ticker: "SHREECEM",
        company_name: "Shree Cement Ltd",
        sector: "Cement",
        aliases: &["Shree Cement"],
    },
    UniverseEntry {
        ticker: "VEDL",
        company_name: "Vedanta Ltd",
        sector: "Metals & Mining",
        aliases: &["Vedanta", "Vedanta Limited"],
    },
    UniverseEntry {
        ticker: "BANKBARODA",
        company_name: "Bank of Baroda",
        sector: "Banking & Finance",
        aliases: &["Bank of Baroda", "BoB"],
    },
    UniverseEntry {
        ticker: "PNB",
        company_name: "Punjab National Bank",
        sector: "Banking & Finance",
        aliases: &["Punjab National Bank", "PNB"],
    },
    UniverseEntry {
        ticker: "ZOMATO",
        company_name: "Zomato Ltd",
        sector: "FMCG",
        aliases: &["Zomato"],
    },
    UniverseEntry {
        ticker: "PAYTM",
        company_name: "One 97 Communications Ltd",
        sector: "Banking & Finance",
        aliases: &["Paytm", "One97 Communications"],
    },
    UniverseEntry {
        ticker: "NYKAA",
        company_name: "FSN E-Commerce Ventures Ltd",
        sector: "FMCG",
        aliases: &["Nykaa", "FSN E-Commerce"],
    },
];

pub fn lookup(ticker: &str) -> Option<&'static UniverseEntry> {
    TRACKED_UNIVERSE.iter().find(|e| e.ticker == ticker)
}

pub fn is_tracked(ticker: &str) -> bool {
    lookup(ticker).is_some()
}

/// Rows for seeding the stocks table.
pub fn tracked_stocks() -> Vec<TrackedStock> {
    TRACKED_UNIVERSE
        .iter()
        .map(|e| TrackedStock {
            ticker: e.ticker.to_string(),
            company_name: e.company_name.to_string(),
            sector: e.sector.to_string(),
        })
        .collect()
}
