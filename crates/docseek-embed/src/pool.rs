use anyhow::{ensure, Result};
use candle_core::{DType, Tensor};

/// Average of the token states whose mask is non-zero: `[B, T, H]` with a
/// `[B, T]` mask of any numeric dtype gives `[B, H]`.
pub fn masked_mean(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, tokens, _) = hidden.dims3()?;
    let (mask_batch, mask_tokens) = attention_mask.dims2()?;
    ensure!(
        (mask_batch, mask_tokens) == (batch, tokens),
        "mask shape [{mask_batch}, {mask_tokens}] does not match hidden states [{batch}, {tokens}, _]"
    );
    let weights = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&weights)?.sum(1)?;
    let counts = weights.sum(1)?;
    Ok(summed.broadcast_div(&counts)?)
}

/// Scale every row of a `[B, H]` tensor to unit Euclidean length.
pub fn l2_normalize(rows: &Tensor) -> Result<Tensor> {
    let eps = if rows.dtype() == DType::F16 { 1e-6 } else { 1e-12 };
    let norms = rows.sqr()?.sum_keepdim(1)?.sqrt()?.affine(1.0, eps)?;
    Ok(rows.broadcast_div(&norms)?)
}

/// Sentence-transformer pooling: [`masked_mean`] then [`l2_normalize`].
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    l2_normalize(&masked_mean(hidden, attention_mask)?)
}
