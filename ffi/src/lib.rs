use engine::api::{simulate_duel, simulate_duel_many, DuelConfig};
use engine::{generate_character_with, Catalog, Dice};
use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const VERSION: &str = concat!("battler-ffi ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub code: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub catalog_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ManyRequest {
    #[serde(default = "default_samples")]
    pub samples: u32,
    #[serde(flatten)]
    pub duel: DuelConfig,
}

fn default_samples() -> u32 {
    100
}

fn ok_envelope(value: impl Serialize) -> String {
    match serde_json::to_value(value) {
        Ok(result) => json!({ "ok": true, "result": result }).to_string(),
        Err(e) => err_envelope(format!("serialize: {}", e)),
    }
}

fn err_envelope(e: impl std::fmt::Display) -> String {
    json!({ "ok": false, "error": e.to_string() }).to_string()
}

/// `{"code": "...", "seed"?: n, "catalog_path"?: "..."}` -> character envelope.
pub fn generate_character_json(input: &str) -> String {
    let req: GenerateRequest = match serde_json::from_str(input) {
        Ok(r) => r,
        Err(e) => return err_envelope(format!("invalid_request: {}", e)),
    };
    let catalog = match req.catalog_path.as_deref() {
        Some(path) => match Catalog::load(path) {
            Ok(c) => c,
            Err(e) => return err_envelope(format!("{:#}", e)),
        },
        None => Catalog::builtin(),
    };
    let mut dice = match req.seed {
        Some(s) => Dice::from_seed(s),
        None => Dice::from_entropy(),
    };
    ok_envelope(generate_character_with(&req.code, &catalog, dice.rng_mut()))
}

pub fn simulate_duel_json(input: &str) -> String {
    let cfg: DuelConfig = match serde_json::from_str(input) {
        Ok(c) => c,
        Err(e) => return err_envelope(format!("invalid_config: {}", e)),
    };
    match simulate_duel(cfg) {
        Ok(result) => ok_envelope(result),
        Err(e) => err_envelope(format!("{:#}", e)),
    }
}

pub fn simulate_duel_many_json(input: &str) -> String {
    let req: ManyRequest = match serde_json::from_str(input) {
        Ok(r) => r,
        Err(e) => return err_envelope(format!("invalid_config: {}", e)),
    };
    match simulate_duel_many(req.duel, req.samples) {
        Ok(stats) => ok_envelope(stats),
        Err(e) => err_envelope(format!("{:#}", e)),
    }
}

fn to_jstring(env: &JNIEnv, s: String) -> jstring {
    match env.new_string(s) {
        Ok(js) => js.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn with_input(mut env: JNIEnv, json: JString, f: fn(&str) -> String) -> jstring {
    let out = match env.get_string(&json) {
        Ok(s) => f(&String::from(s)),
        Err(e) => err_envelope(e),
    };
    to_jstring(&env, out)
}

#[no_mangle]
pub extern "system" fn Java_com_barcodebattler_Ffi_version(env: JNIEnv, _class: JClass) -> jstring {
    to_jstring(&env, VERSION.to_string())
}

#[no_mangle]
pub extern "system" fn Java_com_barcodebattler_Ffi_generateCharacterJson(
    env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    with_input(env, json, generate_character_json)
}

#[no_mangle]
pub extern "system" fn Java_com_barcodebattler_Ffi_simulateDuelJson(
    env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    with_input(env, json, simulate_duel_json)
}

#[no_mangle]
pub extern "system" fn Java_com_barcodebattler_Ffi_simulateDuelManyJson(
    env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    with_input(env, json, simulate_duel_many_json)
}
