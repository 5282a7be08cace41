use super::config::PricingHeuristics;
use crate::offers::domain::Price;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{debug, warn};

/// Which branch of the base/fee resolution produced a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitRule {
    ExplicitFees,
    QuotedBase,
    HeuristicSplit,
    BaseEqualsTotal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BaseFeeSplit {
    pub base: Decimal,
    pub fees: Decimal,
    pub rule: SplitRule,
}

/// Splits the total into base fare and fees. Whatever the branch, one side is
/// solved from the other so `base + fees == total` holds exactly.
pub(crate) fn split_base_and_fees(price: &Price, heuristics: &PricingHeuristics) -> BaseFeeSplit {
    let total = price.total;

    if !price.fees.is_empty() {
        let fee_sum: Decimal = price.fees.iter().map(|fee| fee.amount).sum();
        let quoted_inside_total = price
            .base
            .filter(|base| *base > Decimal::ZERO && *base < total);
        if fee_sum.is_zero() && quoted_inside_total.is_some() {
            debug!(%total, "fee list sums to zero, using the quoted base");
        } else {
            return explicit_fees(fee_sum, price.base, total);
        }
    }

    match price.base {
        Some(base) if base > Decimal::ZERO && base < total => BaseFeeSplit {
            base,
            fees: total - base,
            rule: SplitRule::QuotedBase,
        },
        None => heuristic_split(total, heuristics),
        Some(base) if base.is_zero() => heuristic_split(total, heuristics),
        Some(base) => {
            if base != total {
                warn!(%base, %total, "quoted base outside (0, total], treating total as base");
            }
            BaseFeeSplit {
                base: total,
                fees: Decimal::ZERO,
                rule: SplitRule::BaseEqualsTotal,
            }
        }
    }
}

fn explicit_fees(fee_sum: Decimal, quoted: Option<Decimal>, total: Decimal) -> BaseFeeSplit {
    let fees = if fee_sum > total {
        warn!(%fee_sum, %total, "fee list exceeds total, capping fees at total");
        total
    } else if fee_sum < Decimal::ZERO {
        warn!(%fee_sum, %total, "fee list sums below zero, treating fees as zero");
        Decimal::ZERO
    } else {
        fee_sum
    };
    let base = total - fees;
    if let Some(quoted) = quoted {
        if quoted != total && quoted != base {
            debug!(
                %quoted,
                %fee_sum,
                %total,
                "quoted base disagrees with fee list, solving base from fees"
            );
        }
    }
    BaseFeeSplit {
        base,
        fees,
        rule: SplitRule::ExplicitFees,
    }
}

fn heuristic_split(total: Decimal, heuristics: &PricingHeuristics) -> BaseFeeSplit {
    let base_share = Decimal::ONE - heuristics.fallback_fee_share;
    let base = (total * base_share).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    BaseFeeSplit {
        base,
        fees: total - base,
        rule: SplitRule::HeuristicSplit,
    }
}

/// `fees / total` as a whole percentage, half rounded up; zero for a zero total.
pub(crate) fn fees_percentage(fees: Decimal, total: Decimal) -> u32 {
    if total <= Decimal::ZERO {
        return 0;
    }

    let ratio = (fees / total * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    ratio.to_u32().unwrap_or(0)
}
