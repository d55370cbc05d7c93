use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// Encode `texts` into `(input_ids, attention_mask)` tensors of shape
/// `[B, T]`, where `T` is the longest encoding in the batch capped at
/// `max_len`. Truncated sequences keep their final special token.
pub fn tokenize_batch(tokenizer: &Tokenizer, texts: &[String], max_len: usize, device: &Device) -> Result<(Tensor, Tensor)> {
    let pad_id = tokenizer.get_padding().map(|p| p.pad_id).unwrap_or(0);
    let mut rows: Vec<(Vec<u32>, Vec<u32>)> = Vec::with_capacity(texts.len());
    for text in texts {
        let enc = tokenizer.encode(text.as_str(), true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        let mut ids = enc.get_ids().to_vec();
        let mut mask = enc.get_attention_mask().to_vec();
        if ids.len() > max_len {
            let last = ids[ids.len() - 1];
            ids.truncate(max_len);
            mask.truncate(max_len);
            if let Some(tail) = ids.last_mut() { *tail = last; }
        }
        rows.push((ids, mask));
    }
    let seq_len = rows.iter().map(|(ids, _)| ids.len()).max().unwrap_or(0).max(1);
    let mut flat_ids = Vec::with_capacity(rows.len() * seq_len);
    let mut flat_mask = Vec::with_capacity(rows.len() * seq_len);
    for (mut ids, mut mask) in rows {
        ids.resize(seq_len, pad_id);
        mask.resize(seq_len, 0);
        flat_ids.extend(ids);
        flat_mask.extend(mask);
    }
    let input_ids = Tensor::from_vec(flat_ids, (texts.len(), seq_len), device)?;
    let attention_mask = Tensor::from_vec(flat_mask, (texts.len(), seq_len), device)?;
    Ok((input_ids, attention_mask))
}
