use ffi::{generate_character_json, simulate_duel_json, simulate_duel_many_json, VERSION};

fn main() {
    println!("FFI Version: {}", VERSION);

    let generated = generate_character_json(r#"{"code":"4901005510111","seed":42}"#);
    println!("generate(Shin Ramyun) = {}", generated);

    let mystery = generate_character_json(r#"{"code":"0000000000000","seed":42}"#);
    println!("generate(unknown) = {}", mystery);

    let duel = r#"{"player_code":"4901005510111","opponent_code":"4901313185322","seed":2025}"#;
    println!("Determinism check:");
    println!("  first:  {}", simulate_duel_json(duel).len());
    println!("  second: {}", simulate_duel_json(duel).len());

    let many = r#"{"samples":200,"player_code":"4901005510111","opponent_code":"4901313185322","seed":1}"#;
    println!("many = {}", simulate_duel_many_json(many));

    println!("bad input = {}", simulate_duel_json("not json"));
}
