//! Tiny offline BERT model with the production shape (hidden size 384).
//!
//! One encoder layer with zeroed projections, so the output is the layer-normed
//! word embedding of each token. Good enough to drive the full load → tokenize →
//! forward → pool → normalize path without a download.

use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use serde_json::json;

pub const HIDDEN: usize = 384;
const INTERMEDIATE: usize = 64;
const MAX_POSITIONS: usize = 300;
const TYPE_VOCAB: usize = 2;

const VOCAB: &[&str] = &[
    "[PAD]", "[UNK]", "[CLS]", "[SEP]", "hello", "world", "new", "york", "tech", "##corp", "cat", "mat",
];

/// Write config.json, tokenizer.json and model.safetensors into `dir`.
pub fn write_tiny_model(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("config.json"), config_json().to_string()).unwrap();
    std::fs::write(dir.join("tokenizer.json"), tokenizer_json().to_string()).unwrap();
    candle_core::safetensors::save(&weights(), dir.join("model.safetensors")).unwrap();
}

fn config_json() -> serde_json::Value {
    json!({
        "architectures": ["BertModel"],
        "model_type": "bert",
        "vocab_size": VOCAB.len(),
        "hidden_size": HIDDEN,
        "num_hidden_layers": 1,
        "num_attention_heads": 12,
        "intermediate_size": INTERMEDIATE,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.1,
        "attention_probs_dropout_prob": 0.1,
        "max_position_embeddings": MAX_POSITIONS,
        "type_vocab_size": TYPE_VOCAB,
        "initializer_range": 0.02,
        "layer_norm_eps": 1e-12,
        "pad_token_id": 0,
        "position_embedding_type": "absolute",
        "use_cache": true,
        "classifier_dropout": null
    })
}

fn tokenizer_json() -> serde_json::Value {
    let vocab: serde_json::Map<String, serde_json::Value> =
        VOCAB.iter().enumerate().map(|(i, t)| (t.to_string(), json!(i))).collect();
    json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": {
            "type": "BertNormalizer",
            "clean_text": true,
            "handle_chinese_chars": true,
            "strip_accents": null,
            "lowercase": true
        },
        "pre_tokenizer": { "type": "BertPreTokenizer" },
        "post_processor": {
            "type": "BertProcessing",
            "sep": ["[SEP]", 3],
            "cls": ["[CLS]", 2]
        },
        "decoder": null,
        "model": {
            "type": "WordPiece",
            "unk_token": "[UNK]",
            "continuing_subword_prefix": "##",
            "max_input_chars_per_word": 100,
            "vocab": vocab
        }
    })
}

fn weights() -> HashMap<String, Tensor> {
    let dev = Device::Cpu;
    let zeros = |shape: &[usize]| Tensor::zeros(shape, DType::F32, &dev).unwrap();
    let ones = |shape: &[usize]| Tensor::ones(shape, DType::F32, &dev).unwrap();

    // Distinct, non-constant rows: sin(0.37 * k).
    let word = Tensor::arange(0u32, (VOCAB.len() * HIDDEN) as u32, &dev)
        .unwrap()
        .to_dtype(DType::F32)
        .unwrap()
        .affine(0.37, 0.0)
        .unwrap()
        .sin()
        .unwrap()
        .reshape((VOCAB.len(), HIDDEN))
        .unwrap();

    let mut w = HashMap::new();
    w.insert("embeddings.word_embeddings.weight".to_string(), word);
    w.insert("embeddings.position_embeddings.weight".to_string(), zeros(&[MAX_POSITIONS, HIDDEN]));
    w.insert("embeddings.token_type_embeddings.weight".to_string(), zeros(&[TYPE_VOCAB, HIDDEN]));

    let layer_norms = [
        "embeddings.LayerNorm",
        "encoder.layer.0.attention.output.LayerNorm",
        "encoder.layer.0.output.LayerNorm",
    ];
    for name in layer_norms {
        w.insert(format!("{name}.weight"), ones(&[HIDDEN]));
        w.insert(format!("{name}.bias"), zeros(&[HIDDEN]));
    }

    let linears = [
        ("encoder.layer.0.attention.self.query", HIDDEN, HIDDEN),
        ("encoder.layer.0.attention.self.key", HIDDEN, HIDDEN),
        ("encoder.layer.0.attention.self.value", HIDDEN, HIDDEN),
        ("encoder.layer.0.attention.output.dense", HIDDEN, HIDDEN),
        ("encoder.layer.0.intermediate.dense", INTERMEDIATE, HIDDEN),
        ("encoder.layer.0.output.dense", HIDDEN, INTERMEDIATE),
    ];
    for (name, out_dim, in_dim) in linears {
        w.insert(format!("{name}.weight"), zeros(&[out_dim, in_dim]));
        w.insert(format!("{name}.bias"), zeros(&[out_dim]));
    }

    w
}
