/// Prompts asked in order; the index is the flow step.
pub const QUESTIONS: [&str; 2] = [
    "¿Qué tipo de producto estás buscando? (por ejemplo, laptop, teléfono, tableta)",
    "¿Tienes un modelo específico en mente? (Si no, responde \"no\")",
];

pub const QUESTION_COUNT: usize = QUESTIONS.len();

pub fn question_for(step: usize) -> Option<&'static str> {
    QUESTIONS.get(step).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asks_type_then_model() {
        assert!(question_for(0).unwrap().contains("tipo de producto"));
        assert!(question_for(1).unwrap().contains("modelo"));
        assert_eq!(question_for(QUESTION_COUNT), None);
    }
}
