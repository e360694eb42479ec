//! Question masking cases.

use medsql_core::{mask_question, ArgumentDictionary, EntitySet, ResolvedEntity};
use rstest::rstest;

fn single(domain: &str, text: &str) -> EntitySet {
    let mut set = EntitySet::new();
    set.push(domain, ResolvedEntity::new(text, "X"));
    set
}

#[rstest]
#[case("How many latinos took aspirin?", "DRUG", "aspirin", "How many latinos took <ARG-DRUG><0>?")]
#[case("How many latinos took ASPIRIN?", "DRUG", "aspirin", "How many latinos took <ARG-DRUG><0>?")]
#[case("How many latinos took aspirine?", "DRUG", "aspirin", "How many latinos took aspirine?")]
#[case("Number of african americans", "RACE", "african americans", "Number of <ARG-RACE><0>")]
#[case("aspirin 30g then aspirin", "DRUG", "aspirin", "<ARG-DRUG><0> 30g then <ARG-DRUG><0>")]
#[case("cost in $ (usd)", "UNIT", "$ (usd)", "cost in $ (usd)")]
fn single_entity_masking(
    #[case] question: &str,
    #[case] domain: &str,
    #[case] text: &str,
    #[case] expected: &str,
) {
    let masked = mask_question(question, &single(domain, text)).expect("mask");
    assert_eq!(masked, expected);
}

#[test]
fn longer_mention_wins_over_its_prefix() {
    let mut set = EntitySet::new();
    set.push("CONDITION", ResolvedEntity::new("obstruction", "J98.8"));
    set.push("CONDITION", ResolvedEntity::new("obstruction of larynx", "J38.6"));
    let masked =
        mask_question("patients with obstruction of larynx", &set).expect("mask");
    assert_eq!(masked, "patients with <ARG-CONDITION><1>");
}

#[test]
fn entity_text_equal_to_a_domain_name_is_not_remasked() {
    let mut set = EntitySet::new();
    set.push("DRUG", ResolvedEntity::new("ibuprofen", "5640"));
    set.push("CONDITION", ResolvedEntity::new("drug", "T50.9"));
    let masked = mask_question("drug use with ibuprofen", &set).expect("mask");
    assert_eq!(masked, "<ARG-CONDITION><0> use with <ARG-DRUG><0>");
}

#[test]
fn masked_indices_line_up_with_argument_dictionary() {
    let mut set = EntitySet::new();
    set.push("DRUG", ResolvedEntity::new("aspirin", "1191"));
    set.push("DRUG", ResolvedEntity::new("ibuprofen", "5640"));
    let masked = mask_question("ibuprofen before aspirin", &set).expect("mask");
    let args = ArgumentDictionary::from_entities(&set);

    assert_eq!(masked, "<ARG-DRUG><1> before <ARG-DRUG><0>");
    assert_eq!(args.values("DRUG").unwrap()[1], "5640");
}
