//! Dashboard metric cards: one per scorer, with the value it was scored on.

use analysis_core::{Polarity, Rating, ScoreResult, Trend, ValueBasis};
use serde::{Deserialize, Serialize};

use crate::history::{select_display_value, trend, DisplayValue};
use crate::metrics::FinancialMetrics;
use crate::scorers::{self, ScoringContext};
use crate::stats::{values, YearValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricId {
    Roe,
    Roic,
    NetMargin,
    OperatingMargin,
    Roa,
    CurrentRatio,
    DebtToAssets,
    InterestCoverage,
    NetDebtToEbitda,
    YearsProfitable,
    RevenueGrowth,
    EbitdaGrowth,
    EpsGrowth,
    FcfGrowth,
    Pe,
    Pb,
    Pcf,
    Dividend,
    PeterLynch,
    PriceToMedianPs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricCard {
    pub metric: MetricId,
    pub display: Option<DisplayValue>,
    pub score: ScoreResult,
    pub rating: Rating,
    pub rating_label: String,
    pub trend: Option<Trend>,
}

impl MetricCard {
    fn new(metric: MetricId, display: Option<DisplayValue>, score: ScoreResult) -> Self {
        let rating = Rating::from_score(&score, display.is_some());
        Self {
            metric,
            display,
            score,
            rating,
            rating_label: rating.to_label().to_string(),
            trend: None,
        }
    }

    fn with_trend(mut self, history: &[f64], polarity: Polarity) -> Self {
        self.trend = trend(history, polarity);
        self
    }
}

type GrowthScorer = fn(Option<f64>) -> ScoreResult;

fn current(value: Option<f64>) -> Option<DisplayValue> {
    value
        .filter(|v| v.is_finite())
        .map(|value| DisplayValue { value, basis: ValueBasis::Current })
}

fn scored_on<F>(display: Option<DisplayValue>, scorer: F) -> ScoreResult
where
    F: Fn(Option<f64>) -> ScoreResult,
{
    scorer(display.map(|d| d.value))
}

/// Build every metric card for one company.
pub fn build_metric_cards(m: &FinancialMetrics, ctx: &ScoringContext) -> Vec<MetricCard> {
    let h = &m.history;
    let mut cards = Vec::with_capacity(20);

    let roe = select_display_value(m.roe, &h.roe);
    cards.push(
        MetricCard::new(MetricId::Roe, roe, scored_on(roe, |v| scorers::score_roe(v, ctx.preset)))
            .with_trend(&h.roe, Polarity::HigherIsBetter),
    );

    let roic = select_display_value(m.roic, &h.roic);
    cards.push(
        MetricCard::new(MetricId::Roic, roic, scored_on(roic, |v| scorers::score_roic(v, ctx.wacc_pct)))
            .with_trend(&h.roic, Polarity::HigherIsBetter),
    );

    let net_margin = select_display_value(m.net_margin, &h.net_margin);
    cards.push(
        MetricCard::new(
            MetricId::NetMargin,
            net_margin,
            scored_on(net_margin, |v| scorers::score_net_margin(v, ctx.preset)),
        )
        .with_trend(&h.net_margin, Polarity::HigherIsBetter),
    );

    let op_margin = select_display_value(m.operating_margin, &h.operating_margin);
    cards.push(
        MetricCard::new(
            MetricId::OperatingMargin,
            op_margin,
            scored_on(op_margin, scorers::score_operating_margin),
        )
        .with_trend(&h.operating_margin, Polarity::HigherIsBetter),
    );

    let roa = select_display_value(m.roa, &h.roa);
    cards.push(
        MetricCard::new(MetricId::Roa, roa, scored_on(roa, |v| scorers::score_roa(v, ctx.preset)))
            .with_trend(&h.roa, Polarity::HigherIsBetter),
    );

    let current_ratio = select_display_value(m.current_ratio, &h.current_ratio);
    cards.push(
        MetricCard::new(
            MetricId::CurrentRatio,
            current_ratio,
            scored_on(current_ratio, scorers::score_current_ratio),
        )
        .with_trend(&h.current_ratio, Polarity::HigherIsBetter),
    );

    let debt_to_assets = select_display_value(m.debt_to_assets, &h.debt_to_assets);
    cards.push(
        MetricCard::new(
            MetricId::DebtToAssets,
            debt_to_assets,
            scored_on(debt_to_assets, scorers::score_debt_to_assets),
        )
        .with_trend(&h.debt_to_assets, Polarity::LowerIsBetter),
    );

    let coverage = select_display_value(m.interest_coverage, &h.interest_coverage);
    cards.push(
        MetricCard::new(
            MetricId::InterestCoverage,
            coverage,
            scored_on(coverage, scorers::score_interest_coverage),
        )
        .with_trend(&h.interest_coverage, Polarity::HigherIsBetter),
    );

    let leverage = select_display_value(m.net_debt_to_ebitda, &h.net_debt_to_ebitda);
    let underwater = matches!((m.net_debt, m.ebitda), (Some(nd), Some(e)) if nd > 0.0 && e <= 0.0);
    let leverage_score = if underwater {
        scorers::score_net_debt(m.net_debt, m.ebitda)
    } else {
        scored_on(leverage, scorers::score_net_debt_to_ebitda)
    };
    let leverage_display = if underwater { current(m.net_debt) } else { leverage };
    cards.push(
        MetricCard::new(MetricId::NetDebtToEbitda, leverage_display, leverage_score)
            .with_trend(&h.net_debt_to_ebitda, Polarity::LowerIsBetter),
    );

    let (profitable, on_record) = m.profitable_years();
    let years = current(scorers::profitability::normalized_profitable_years(profitable, on_record));
    cards.push(MetricCard::new(
        MetricId::YearsProfitable,
        years,
        scorers::score_years_profitable(profitable, on_record),
    ));

    let growth_cards: [(MetricId, Option<DisplayValue>, &[YearValue], GrowthScorer); 4] = [
        (MetricId::RevenueGrowth, m.revenue_growth, &h.revenue, scorers::score_revenue_growth),
        (MetricId::EbitdaGrowth, m.ebitda_growth, &h.ebitda, scorers::score_ebitda_growth),
        (MetricId::EpsGrowth, m.eps_growth, &h.eps, scorers::score_eps_growth),
        (MetricId::FcfGrowth, m.fcf_growth, &h.fcf, scorers::score_fcf_growth),
    ];
    for (id, growth, series, scorer) in growth_cards {
        cards.push(
            MetricCard::new(id, growth, scored_on(growth, scorer))
                .with_trend(&values(series), Polarity::HigherIsBetter),
        );
    }

    let pe = current(m.pe);
    cards.push(MetricCard::new(MetricId::Pe, pe, scorers::score_pe(m.pe, ctx.industry_pe)));

    let pb = current(m.pb);
    cards.push(MetricCard::new(MetricId::Pb, pb, scorers::score_pb(m.pb)));

    let pcf = current(m.price_to_fcf);
    cards.push(
        MetricCard::new(MetricId::Pcf, pcf, scorers::score_pcf(m.price_to_fcf, m.fcf_mostly_negative()))
            .with_trend(&values(&h.fcf), Polarity::HigherIsBetter),
    );

    let dividend = m.dividend_inputs();
    let dividend_display = current(m.dividend_yield).filter(|_| dividend.pays_dividend());
    cards.push(
        MetricCard::new(MetricId::Dividend, dividend_display, scorers::score_dividend(&dividend))
            .with_trend(&values(&h.dividends_per_share), Polarity::HigherIsBetter),
    );

    let lynch = current(scorers::valuation::price_to_lynch(m.price, m.lynch_fair_value));
    cards.push(MetricCard::new(
        MetricId::PeterLynch,
        lynch,
        scorers::score_peter_lynch(m.price, m.lynch_fair_value),
    ));

    let ps_discount = scorers::valuation::median_ps_discount(m.ps, m.median_ps_5y);
    cards.push(
        MetricCard::new(
            MetricId::PriceToMedianPs,
            current(ps_discount),
            scorers::score_price_to_median_ps(ps_discount),
        )
        .with_trend(&h.price_to_sales, Polarity::LowerIsBetter),
    );

    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::IndustryPreset;
    use analysis_core::fixtures;

    #[test]
    fn test_roe_median_sixteen_is_excellent() {
        let mut m = FinancialMetrics::default();
        m.history.roe = vec![17.0, 16.0, 15.0, 16.0, 18.0, 14.0, 16.0, 20.0, 12.0, 16.0];
        m.roe = Some(17.0);
        let cards = build_metric_cards(&m, &ScoringContext::default());
        let roe = cards.iter().find(|c| c.metric == MetricId::Roe).unwrap();
        let display = roe.display.unwrap();
        assert_eq!(display.basis, ValueBasis::TenYearMedian);
        assert_eq!(display.value, 16.0);
        assert_eq!((roe.score.score, roe.score.max_score), (2.0, 2.0));
        assert_eq!(roe.rating_label, "Exzellent");
    }

    #[test]
    fn test_debt_free_coverage_scores_full() {
        let mut snap = fixtures::quality_compounder();
        for income in &mut snap.income {
            income.interest_expense = None;
        }
        let m = FinancialMetrics::from_snapshot(&snap);
        let cards = build_metric_cards(&m, &ScoringContext::default());
        let coverage = cards.iter().find(|c| c.metric == MetricId::InterestCoverage).unwrap();
        assert_eq!((coverage.score.score, coverage.score.max_score), (6.0, 6.0));
    }

    #[test]
    fn test_one_card_per_scorer() {
        let m = FinancialMetrics::from_snapshot(&fixtures::quality_compounder());
        let cards = build_metric_cards(&m, &ScoringContext::default());
        assert_eq!(cards.len(), 20);
        for card in &cards {
            assert!(card.score.score <= card.score.max_score);
        }
    }

    #[test]
    fn test_compounder_card_values() {
        let m = FinancialMetrics::from_snapshot(&fixtures::quality_compounder());
        let ctx = ScoringContext { preset: IndustryPreset::Software, wacc_pct: Some(9.0), industry_pe: None };
        let cards = build_metric_cards(&m, &ctx);
        let find = |id| cards.iter().find(|c| c.metric == id).unwrap();

        // ROE 25% clears even the software preset
        assert_eq!(find(MetricId::Roe).score.score, 2.0);
        assert_eq!(find(MetricId::NetDebtToEbitda).score.score, 6.0);
        assert_eq!(find(MetricId::YearsProfitable).score.score, 4.0);
        assert_eq!(find(MetricId::RevenueGrowth).score.score, 3.0);
        assert_eq!(find(MetricId::Roe).trend, Some(Trend::Stable));
    }

    #[test]
    fn test_missing_data_cards() {
        let m = FinancialMetrics::from_snapshot(&fixtures::profile_only());
        let cards = build_metric_cards(&m, &ScoringContext::default());
        let roe = cards.iter().find(|c| c.metric == MetricId::Roe).unwrap();
        assert_eq!(roe.rating, Rating::NoData);
        assert_eq!(roe.rating_label, "Keine Daten");
        assert_eq!(roe.score.max_score, 2.0);
    }

    #[test]
    fn test_underwater_leverage_scores_zero() {
        let m = FinancialMetrics::from_snapshot(&fixtures::loss_maker());
        let cards = build_metric_cards(&m, &ScoringContext::default());
        let lev = cards.iter().find(|c| c.metric == MetricId::NetDebtToEbitda).unwrap();
        assert_eq!(lev.score.score, 0.0);
        assert_eq!(lev.rating, Rating::Weak);
    }
}
