use statrs::distribution::{Binomial, Discrete};

/// Floor applied to the expected gene-read fraction so that every copy-number
/// hypothesis keeps a non-zero likelihood under sequencing error.
pub const READ_ERROR_RATE: f64 = 0.01;

pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

/// Posterior probability of each gene copy number `0..=total_cn` given that
/// `gene_reads` of `total_reads` reads carry the gene allele.
///
/// Uses a uniform prior and binomial read sampling with success probability
/// `c / total_cn`, clamped to `[error_rate, 1 - error_rate]`.
pub fn gene_cn_posteriors(
    gene_reads: usize,
    total_reads: usize,
    total_cn: u32,
    error_rate: f64,
) -> Option<Vec<f64>> {
    if total_reads == 0 || total_cn == 0 || gene_reads > total_reads {
        return None;
    }

    let log_likelihoods = (0..=total_cn)
        .map(|cn| {
            let p = (cn as f64 / total_cn as f64).clamp(error_rate, 1.0 - error_rate);
            Binomial::new(p, total_reads as u64)
                .map(|model| model.ln_pmf(gene_reads as u64))
                .ok()
        })
        .collect::<Option<Vec<_>>>()?;

    let norm = log_sum_exp(&log_likelihoods);
    if !norm.is_finite() {
        return None;
    }
    Some(log_likelihoods.iter().map(|l| (l - norm).exp()).collect())
}

/// Posterior probability that exactly one copy carries the gene allele.
pub fn single_copy_likelihood(gene_reads: usize, total_reads: usize, total_cn: u32) -> Option<f64> {
    gene_cn_posteriors(gene_reads, total_reads, total_cn, READ_ERROR_RATE)
        .and_then(|posteriors| posteriors.get(1).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn log_sum_exp_matches_direct_sum() {
        let values = [0.5_f64.ln(), 0.25_f64.ln(), 0.25_f64.ln()];
        assert_relative_eq!(log_sum_exp(&values), 0.0, epsilon = 1e-12);
        assert_eq!(log_sum_exp(&[]), f64::NEG_INFINITY);
    }

    #[test]
    fn posteriors_sum_to_one() {
        let posteriors = gene_cn_posteriors(7, 20, 4, READ_ERROR_RATE).unwrap();
        assert_eq!(posteriors.len(), 5);
        assert_relative_eq!(posteriors.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn one_third_gene_fraction_supports_single_copy_at_cn3() {
        let likelihood = single_copy_likelihood(10, 30, 3).unwrap();
        assert!(likelihood > 0.99);
    }

    #[test]
    fn two_thirds_gene_fraction_rejects_single_copy_at_cn3() {
        let likelihood = single_copy_likelihood(20, 30, 3).unwrap();
        assert!(likelihood < 0.01);
    }

    #[test]
    fn no_reads_gives_no_likelihood() {
        assert_eq!(single_copy_likelihood(0, 0, 3), None);
        assert_eq!(single_copy_likelihood(1, 2, 0), None);
        assert_eq!(single_copy_likelihood(3, 2, 2), None);
    }
}
