use super::FunctionRegistry;
use super::signature::{
    CallSyntax, FunctionCategory, FunctionSignature, ParamSpec, PlotProfile,
};
use super::value::ParamSet;

/// Defines the `source + length` family, which all share one parameter schema.
macro_rules! define_length_indicators {
    ( $( ($name:expr, $function:expr, $category:expr, $source:expr, $length:expr, $max:expr, $plot:expr, $description:expr) ),* $(,)? ) => {
        fn register_length_indicators(registry: &mut FunctionRegistry) {
            $(
                registry.register(
                    FunctionSignature::call($name, $category, $function)
                        .describe($description)
                        .param(ParamSpec::source("source", $source))
                        .param(ParamSpec::int("length", $length).required().range(1.0, $max))
                        .plot($plot),
                );
            )*
        }
    };
}

define_length_indicators! {
    ("sma", "ta.sma", FunctionCategory::MovingAverage, "close", 20, 5000.0, PlotProfile::overlay(), "Simple moving average"),
    ("ema", "ta.ema", FunctionCategory::MovingAverage, "close", 20, 5000.0, PlotProfile::overlay(), "Exponential moving average"),
    ("wma", "ta.wma", FunctionCategory::MovingAverage, "close", 20, 5000.0, PlotProfile::overlay(), "Weighted moving average"),
    ("vwma", "ta.vwma", FunctionCategory::MovingAverage, "close", 20, 5000.0, PlotProfile::overlay(), "Volume-weighted moving average"),
    ("hma", "ta.hma", FunctionCategory::MovingAverage, "close", 9, 5000.0, PlotProfile::overlay(), "Hull moving average"),
    ("rma", "ta.rma", FunctionCategory::MovingAverage, "close", 14, 5000.0, PlotProfile::overlay(), "Wilder's moving average"),
    ("cci", "ta.cci", FunctionCategory::Oscillator, "hlc3", 20, 500.0, PlotProfile::oscillator(100.0, -100.0), "Commodity channel index"),
    ("mfi", "ta.mfi", FunctionCategory::Volume, "hlc3", 14, 500.0, PlotProfile::oscillator(80.0, 20.0), "Money flow index"),
    ("mom", "ta.mom", FunctionCategory::Oscillator, "close", 10, 500.0, PlotProfile::overlay().with_reference(0.0, "Zero", "color.gray"), "Momentum"),
    ("roc", "ta.roc", FunctionCategory::Oscillator, "close", 9, 500.0, PlotProfile::overlay().with_reference(0.0, "Zero", "color.gray"), "Rate of change"),
    ("stdev", "ta.stdev", FunctionCategory::Volatility, "close", 20, 5000.0, PlotProfile::overlay(), "Standard deviation"),
    ("highest", "ta.highest", FunctionCategory::Trend, "high", 20, 5000.0, PlotProfile::overlay(), "Highest value over a lookback"),
    ("lowest", "ta.lowest", FunctionCategory::Trend, "low", 20, 5000.0, PlotProfile::overlay(), "Lowest value over a lookback"),
}

pub(super) fn register_builtins(registry: &mut FunctionRegistry) {
    register_length_indicators(registry);

    registry.register(
        FunctionSignature::call("rsi", FunctionCategory::Oscillator, "ta.rsi")
            .describe("Relative strength index")
            .param(ParamSpec::source("source", "close"))
            .param(ParamSpec::int("period", 14).required().range(1.0, 500.0))
            .plot(PlotProfile::oscillator(70.0, 30.0)),
    );

    registry.register(
        FunctionSignature::call("macd", FunctionCategory::Trend, "ta.macd")
            .describe("Moving average convergence divergence")
            .param(ParamSpec::source("source", "close"))
            .param(ParamSpec::int("fastLength", 12).required().range(1.0, 500.0))
            .param(ParamSpec::int("slowLength", 26).required().range(1.0, 500.0))
            .param(ParamSpec::int("signalLength", 9).required().range(1.0, 500.0))
            .returns(&["line", "signal", "histogram"])
            .plot(
                PlotProfile::overlay()
                    .with_histogram("histogram")
                    .with_reference(0.0, "Zero", "color.gray"),
            )
            .validate_with(fast_below_slow),
    );

    registry.register(
        FunctionSignature::call("bb", FunctionCategory::Volatility, "ta.bb")
            .describe("Bollinger Bands")
            .param(ParamSpec::source("source", "close"))
            .param(ParamSpec::int("length", 20).required().range(1.0, 5000.0))
            .param(
                ParamSpec::float("mult", 2.0)
                    .titled("Multiplier")
                    .range(0.001, 50.0)
                    .step(0.1),
            )
            .returns(&["middle", "upper", "lower"]),
    );

    registry.register(
        FunctionSignature::call("kc", FunctionCategory::Volatility, "ta.kc")
            .describe("Keltner Channels")
            .param(ParamSpec::source("source", "close"))
            .param(ParamSpec::int("length", 20).required().range(1.0, 5000.0))
            .param(
                ParamSpec::float("mult", 1.5)
                    .titled("Multiplier")
                    .range(0.001, 50.0)
                    .step(0.1),
            )
            .param(ParamSpec::boolean("useTrueRange", true))
            .returns(&["middle", "upper", "lower"]),
    );

    registry.register(
        FunctionSignature::new(
            "stoch",
            FunctionCategory::Oscillator,
            CallSyntax::Composite(vec![
                "ta.sma(ta.stoch({source}, high, low, {kLength}), {kSmoothing})".to_string(),
                "ta.sma({out:k}, {dSmoothing})".to_string(),
            ]),
        )
        .describe("Stochastic oscillator")
        .param(ParamSpec::source("source", "close"))
        .param(ParamSpec::int("kLength", 14).titled("%K Length").required().range(1.0, 500.0))
        .param(ParamSpec::int("kSmoothing", 3).titled("%K Smoothing").range(1.0, 100.0))
        .param(ParamSpec::int("dSmoothing", 3).titled("%D Smoothing").range(1.0, 100.0))
        .returns(&["k", "d"])
        .plot(PlotProfile::oscillator(80.0, 20.0)),
    );

    registry.register(
        FunctionSignature::call("dmi", FunctionCategory::Trend, "ta.dmi")
            .describe("Directional movement index")
            .param(ParamSpec::int("diLength", 14).titled("DI Length").required().range(1.0, 500.0))
            .param(
                ParamSpec::int("adxSmoothing", 14)
                    .titled("ADX Smoothing")
                    .required()
                    .range(1.0, 500.0),
            )
            .returns(&["plus", "minus", "adx"])
            .plot(PlotProfile::overlay().with_reference(25.0, "Trend Strength", "color.gray")),
    );

    registry.register(
        FunctionSignature::call("supertrend", FunctionCategory::Trend, "ta.supertrend")
            .describe("Supertrend")
            .param(
                ParamSpec::float("factor", 3.0)
                    .required()
                    .range(0.01, 100.0)
                    .step(0.1),
            )
            .param(ParamSpec::int("atrPeriod", 10).titled("ATR Period").required().range(1.0, 500.0))
            .returns(&["value", "direction"]),
    );

    registry.register(
        FunctionSignature::call("atr", FunctionCategory::Volatility, "ta.atr")
            .describe("Average true range")
            .param(ParamSpec::int("length", 14).required().range(1.0, 5000.0)),
    );

    registry.register(
        FunctionSignature::call("willr", FunctionCategory::Oscillator, "ta.wpr")
            .describe("Williams %R")
            .param(ParamSpec::int("length", 14).required().range(1.0, 500.0))
            .plot(PlotProfile::oscillator(-20.0, -80.0)),
    );

    registry.register(
        FunctionSignature::call("vwap", FunctionCategory::Volume, "ta.vwap")
            .describe("Volume-weighted average price")
            .param(ParamSpec::source("source", "hlc3")),
    );

    // Comparators used by condition nodes.
    registry.register(
        FunctionSignature::call("crossover", FunctionCategory::Operator, "ta.crossover")
            .describe("True when the first series crosses above the second")
            .param(ParamSpec::source("source", "close").required())
            .param(ParamSpec::source("reference", "close").required())
            .plot(PlotProfile::hidden()),
    );
    registry.register(
        FunctionSignature::call("crossunder", FunctionCategory::Operator, "ta.crossunder")
            .describe("True when the first series crosses below the second")
            .param(ParamSpec::source("source", "close").required())
            .param(ParamSpec::source("reference", "close").required())
            .plot(PlotProfile::hidden()),
    );

    for (alias, canonical) in [
        ("moving_average", "sma"),
        ("ma", "sma"),
        ("bollinger", "bb"),
        ("bollinger_bands", "bb"),
        ("bbands", "bb"),
        ("keltner", "kc"),
        ("keltner_channels", "kc"),
        ("stochastic", "stoch"),
        ("williams_r", "willr"),
        ("wpr", "willr"),
        ("momentum", "mom"),
        ("adx", "dmi"),
    ] {
        registry.alias(alias, canonical);
    }
}

fn fast_below_slow(params: &ParamSet) -> Result<(), String> {
    match (params.get_f64("fastLength"), params.get_f64("slowLength")) {
        (Some(fast), Some(slow)) if fast >= slow => Err(format!(
            "fastLength ({}) must be less than slowLength ({})",
            fast, slow
        )),
        _ => Ok(()),
    }
}
