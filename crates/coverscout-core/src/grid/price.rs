// Price formatting and the aggregate monthly cost of a result.

use crate::model::{BillingInterval, Package};

/// Cents as a decimal string with two places: 1000 -> "10.00".
pub fn format_cents(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// Header line for the yearly-subscription price: "$10.00/mo yearly".
pub fn yearly_line(package: &Package) -> String {
    format!(
        "${}/mo yearly",
        format_cents(u64::from(package.monthly_price_yearly_subscription_in_cents))
    )
}

/// Header line for the monthly price, if the package offers one.
pub fn monthly_line(package: &Package) -> Option<String> {
    package
        .monthly_price_cents
        .map(|c| format!("${}/mo monthly", format_cents(u64::from(c))))
}

/// Monthly cost of a set of packages under one billing interval.
///
/// A pure function of its inputs: callers compute it from the current result
/// and billing interval every time they need it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PriceSummary {
    pub billing: BillingInterval,
    pub total_cents: u64,
    /// Number of packages that contributed to the total.
    pub priced: usize,
    /// Packages without a price under this billing interval.
    pub unpriced: Vec<String>,
}

impl PriceSummary {
    pub fn compute(packages: &[Package], billing: BillingInterval) -> Self {
        let mut summary = PriceSummary {
            billing,
            ..PriceSummary::default()
        };
        for package in packages {
            match package.price_for(billing) {
                Some(cents) => {
                    summary.total_cents += u64::from(cents);
                    summary.priced += 1;
                }
                None => summary.unpriced.push(package.name.clone()),
            }
        }
        summary
    }

    /// "$X.XX/mo", suffixed with the interval.
    pub fn display(&self) -> String {
        let interval = match self.billing {
            BillingInterval::Yearly => "yearly subscription",
            BillingInterval::Monthly => "monthly billing",
        };
        format!("${}/mo ({interval})", format_cents(self.total_cents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(name: &str, monthly: Option<u32>, yearly: u32) -> Package {
        Package {
            id: 0,
            name: name.into(),
            monthly_price_cents: monthly,
            monthly_price_yearly_subscription_in_cents: yearly,
        }
    }

    #[test]
    fn format_cents_pads_two_places() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(1000), "10.00");
        assert_eq!(format_cents(2999), "29.99");
    }

    #[test]
    fn header_lines() {
        let a = pkg("A", None, 1000);
        assert_eq!(yearly_line(&a), "$10.00/mo yearly");
        assert_eq!(monthly_line(&a), None);

        let b = pkg("B", Some(500), 900);
        assert_eq!(yearly_line(&b), "$9.00/mo yearly");
        assert_eq!(monthly_line(&b).as_deref(), Some("$5.00/mo monthly"));
    }

    #[test]
    fn zero_monthly_price_is_still_shown() {
        let free = pkg("Free", Some(0), 0);
        assert_eq!(monthly_line(&free).as_deref(), Some("$0.00/mo monthly"));
    }

    #[test]
    fn summary_follows_billing_interval() {
        let result = vec![pkg("A", None, 1000), pkg("B", Some(500), 900)];

        let yearly = PriceSummary::compute(&result, BillingInterval::Yearly);
        assert_eq!(yearly.total_cents, 1900);
        assert_eq!(yearly.priced, 2);
        assert!(yearly.unpriced.is_empty());

        let monthly = PriceSummary::compute(&result, BillingInterval::Monthly);
        assert_eq!(monthly.total_cents, 500);
        assert_eq!(monthly.priced, 1);
        assert_eq!(monthly.unpriced, vec!["A".to_string()]);
    }

    #[test]
    fn summary_display() {
        let summary = PriceSummary::compute(&[pkg("B", Some(500), 900)], BillingInterval::Yearly);
        assert_eq!(summary.display(), "$9.00/mo (yearly subscription)");
        assert_eq!(
            PriceSummary::compute(&[], BillingInterval::Monthly).display(),
            "$0.00/mo (monthly billing)"
        );
    }
}
