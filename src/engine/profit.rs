// ==========================================
// 报价成本核算系统 - 订单利润汇总
// ==========================================
// 职责: 全部产品行 → 预期营收 → 税前/税后利润 → 预留基金 → 净利润
// ==========================================

use serde::{Deserialize, Serialize};

/// 订单级利润表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfitStatement {
    /// 预期营收 = Σ(对客报价 × 主产出产量) + Σ副产品价值
    pub expected_revenue: f64,
    /// 订单总成本 = Σ计划生产成本 + 一般费用全组合计 + 出口费用合计
    pub total_order_cost: f64,
    /// 税前利润
    pub profit_before_tax: f64,
    /// 税额
    pub tax_amount: f64,
    /// 税后利润
    pub profit_after_tax: f64,
    /// 预留基金
    pub reserve: f64,
    /// 净利润
    pub net_profit: f64,
}

/// 单行对营收/成本汇总的贡献
#[derive(Debug, Clone, Copy, Default)]
pub struct RevenueInput {
    pub customer_price: f64,
    pub primary_mass: f64,
    pub byproduct_value: f64,
    pub production_cost_planned: f64,
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// 汇总订单利润表。
///
/// 注意成本口径：一般费用取全组无条件合计（与选择集无关——
/// 孤立费用组虽不进任何单品成本，但订单层面的支出是真实的），
/// 出口费用同样取合计。
pub fn rollup(
    inputs: &[RevenueInput],
    general_grand_total: f64,
    export_grand_total: f64,
    tax_pct: f64,
    reserve_pct: f64,
) -> ProfitStatement {
    let expected_revenue: f64 = inputs
        .iter()
        .map(|i| i.customer_price * i.primary_mass + i.byproduct_value)
        .sum();
    let expected_revenue = finite_or_zero(expected_revenue);

    let production_total: f64 = inputs.iter().map(|i| i.production_cost_planned).sum();
    let total_order_cost =
        finite_or_zero(production_total + general_grand_total + export_grand_total);

    let profit_before_tax = expected_revenue - total_order_cost;
    let tax_amount = finite_or_zero(profit_before_tax * tax_pct / 100.0);
    let profit_after_tax = profit_before_tax - tax_amount;
    let reserve = finite_or_zero(profit_after_tax * reserve_pct / 100.0);
    let net_profit = profit_after_tax - reserve;

    ProfitStatement {
        expected_revenue,
        total_order_cost,
        profit_before_tax,
        tax_amount,
        profit_after_tax,
        reserve,
        net_profit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollup_basic() {
        let inputs = [
            RevenueInput {
                customer_price: 2_800.0,
                primary_mass: 1_000.0,
                byproduct_value: 500_000.0,
                production_cost_planned: 2_000_000.0,
            },
            RevenueInput {
                customer_price: 1_500.0,
                primary_mass: 400.0,
                byproduct_value: 0.0,
                production_cost_planned: 400_000.0,
            },
        ];

        let statement = rollup(&inputs, 1_000_000.0, 300_000.0, 20.0, 5.0);

        // 营收 = 2800×1000 + 500,000 + 1500×400 = 3,900,000
        assert_eq!(statement.expected_revenue, 3_900_000.0);
        // 成本 = 2,400,000 + 1,000,000 + 300,000 = 3,700,000
        assert_eq!(statement.total_order_cost, 3_700_000.0);
        assert_eq!(statement.profit_before_tax, 200_000.0);
        assert_eq!(statement.tax_amount, 40_000.0);
        assert_eq!(statement.profit_after_tax, 160_000.0);
        assert_eq!(statement.reserve, 8_000.0);
        assert_eq!(statement.net_profit, 152_000.0);
    }

    #[test]
    fn test_rollup_zero_percentages() {
        let inputs = [RevenueInput {
            customer_price: 1_000.0,
            primary_mass: 100.0,
            byproduct_value: 0.0,
            production_cost_planned: 60_000.0,
        }];

        let statement = rollup(&inputs, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(statement.profit_before_tax, 40_000.0);
        assert_eq!(statement.net_profit, 40_000.0);
    }

    #[test]
    fn test_rollup_loss_order() {
        // 亏损订单: 税额/预留为负数按公式照算（负利润的税为负）
        let inputs = [RevenueInput {
            customer_price: 100.0,
            primary_mass: 10.0,
            byproduct_value: 0.0,
            production_cost_planned: 5_000.0,
        }];

        let statement = rollup(&inputs, 0.0, 0.0, 20.0, 5.0);
        assert_eq!(statement.profit_before_tax, -4_000.0);
        assert_eq!(statement.tax_amount, -800.0);
        assert_eq!(statement.profit_after_tax, -3_200.0);
    }
}
