//! Covariance estimation from fund metadata.
//!
//! No return history is used: pairwise correlations are guessed from the
//! funds' names and categories, then scaled by the reported volatilities.
//! The result is symmetric with a non-negative diagonal but is not
//! guaranteed to be positive semi-definite; [`clip_eigenvalues`] repairs it
//! before it reaches a solver.

use bpif_core::{FundSnapshot, Result, Ticker, validate_funds};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Relative size of a negative eigenvalue treated as rounding noise.
const PSD_TOLERANCE: f64 = 1e-12;

/// Guesses the correlation between two funds.
///
/// Implementations must be symmetric in their arguments. The diagonal of the
/// covariance matrix never goes through this trait.
pub trait CorrelationModel: Send + Sync {
    /// Correlation between two distinct funds, in `[-1, 1]`.
    fn correlation(&self, a: &FundSnapshot, b: &FundSnapshot) -> f64;

    /// Name of this model.
    fn name(&self) -> &str;
}

/// Asset class recognised by keyword search over fund tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// Government and corporate bond funds
    Bond,
    /// Equity index funds
    Equity,
    /// Gold funds
    Gold,
    /// Money-market and currency funds
    Currency,
}

impl AssetClass {
    /// Classes in the order they are tested.
    pub const ALL: [Self; 4] = [Self::Bond, Self::Equity, Self::Gold, Self::Currency];

    /// Lowercase substrings that mark a fund as belonging to this class.
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Bond => &["bond", "облиг", "gb", "cb"],
            Self::Equity => &["equity", "акц", "mx"],
            Self::Gold => &["gold", "золот"],
            Self::Currency => &["usd", "eur", "yuan"],
        }
    }

    /// Correlation assumed between two funds of this class.
    pub const fn correlation(self) -> f64 {
        match self {
            Self::Bond => 0.7,
            Self::Equity => 0.8,
            Self::Gold => 0.6,
            Self::Currency => 0.4,
        }
    }

    /// Whether lowercased `tags` contain any keyword of this class.
    pub fn matches(self, tags: &str) -> bool {
        self.keywords().iter().any(|k| tags.contains(k))
    }
}

/// Keyword heuristic: same-class pairs get the class correlation, every
/// other pair gets `unmatched`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordCorrelation {
    /// Correlation for pairs without a shared class
    pub unmatched: f64,
}

impl KeywordCorrelation {
    /// Create a heuristic with the given cross-class correlation.
    pub const fn new(unmatched: f64) -> Self {
        Self { unmatched }
    }

    /// First class shared by both tag strings, if any.
    pub fn shared_class(tags_a: &str, tags_b: &str) -> Option<AssetClass> {
        AssetClass::ALL
            .into_iter()
            .find(|class| class.matches(tags_a) && class.matches(tags_b))
    }
}

impl Default for KeywordCorrelation {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl CorrelationModel for KeywordCorrelation {
    fn correlation(&self, a: &FundSnapshot, b: &FundSnapshot) -> f64 {
        Self::shared_class(&a.tags(), &b.tags()).map_or(self.unmatched, AssetClass::correlation)
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Numeric inputs for the optimizer over a fixed ticker ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationInputs {
    /// Fund tickers; index `i` everywhere refers to `tickers[i]`
    pub tickers: Vec<Ticker>,
    /// Annual returns as decimals
    pub returns: Array1<f64>,
    /// Annual covariance matrix of decimal returns
    pub covariance: Array2<f64>,
}

impl OptimizationInputs {
    /// Number of funds.
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    /// Whether there are no funds.
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// Per-fund volatilities (decimal), read back from the diagonal.
    pub fn volatilities(&self) -> Array1<f64> {
        self.covariance.diag().mapv(|v| v.max(0.0).sqrt())
    }
}

/// Build optimizer inputs with the default [`KeywordCorrelation`].
///
/// # Errors
///
/// Fails when the fund list does not pass [`validate_funds`].
///
/// # Examples
///
/// ```
/// use bpif_core::FundSnapshot;
/// use bpif_optimize::estimate;
///
/// let funds = vec![
///     FundSnapshot::new("SBGB", 8.0, 5.0).with_short_name("Gov bonds"),
///     FundSnapshot::new("AKMB", 9.0, 6.0).with_short_name("Bond plus"),
/// ];
/// let inputs = estimate(&funds).unwrap();
/// assert!((inputs.covariance[[0, 1]] - 0.7 * 0.05 * 0.06).abs() < 1e-12);
/// ```
pub fn estimate(funds: &[FundSnapshot]) -> Result<OptimizationInputs> {
    estimate_with(funds, &KeywordCorrelation::default())
}

/// Build optimizer inputs with a custom correlation model.
pub fn estimate_with(
    funds: &[FundSnapshot],
    model: &dyn CorrelationModel,
) -> Result<OptimizationInputs> {
    validate_funds(funds)?;

    let n = funds.len();
    let tickers = funds.iter().map(|f| f.ticker.clone()).collect();
    let returns = Array1::from_iter(funds.iter().map(|f| f.annual_return / 100.0));
    let vols: Vec<f64> = funds.iter().map(|f| f.volatility / 100.0).collect();

    let mut covariance = Array2::zeros((n, n));
    for i in 0..n {
        covariance[[i, i]] = vols[i] * vols[i];
        for j in (i + 1)..n {
            let cov = model.correlation(&funds[i], &funds[j]) * vols[i] * vols[j];
            covariance[[i, j]] = cov;
            covariance[[j, i]] = cov;
        }
    }

    Ok(OptimizationInputs {
        tickers,
        returns,
        covariance,
    })
}

/// Nearest positive semi-definite matrix by eigenvalue clipping.
///
/// Negative eigenvalues of the symmetric part are set to zero and the matrix
/// is rebuilt. Matrices that are already PSD come back unchanged.
///
/// # Examples
///
/// ```
/// use bpif_optimize::clip_eigenvalues;
/// use ndarray::array;
///
/// let corr = array![[1.0, 0.9, -0.9], [0.9, 1.0, 0.9], [-0.9, 0.9, 1.0]];
/// let repaired = clip_eigenvalues(&corr);
/// let w = array![1.0, -1.0, 1.0];
/// assert!(w.dot(&corr.dot(&w)) < 0.0);
/// assert!(w.dot(&repaired.dot(&w)) > -1e-12);
/// ```
pub fn clip_eigenvalues(covariance: &Array2<f64>) -> Array2<f64> {
    let n = covariance.nrows();
    let symmetric = DMatrix::from_fn(n, n, |i, j| {
        0.5 * (covariance[[i, j]] + covariance[[j, i]])
    });
    let mut eigen = symmetric.symmetric_eigen();

    let scale = eigen.eigenvalues.iter().fold(0.0_f64, |a, l| a.max(l.abs()));
    if eigen.eigenvalues.iter().all(|&l| l >= -PSD_TOLERANCE * scale) {
        return covariance.to_owned();
    }

    eigen.eigenvalues = eigen.eigenvalues.map(|l| l.max(0.0));
    let repaired = eigen.recompose();
    Array2::from_shape_fn((n, n), |(i, j)| 0.5 * (repaired[(i, j)] + repaired[(j, i)]))
}
