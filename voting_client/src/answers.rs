//! Translation of the voter's ballot answers into actual voting options.

use crate::*;

pub const EMPTY_LIST: &str = "EMPTY_LIST";
pub const EMPTY_CANDIDATE_POSITION: &str = "EMPTY_CANDIDATE_POSITION";
pub const WRITE_IN_POSITION: &str = "WRITE_IN_POSITION";

/// Everything the voter selected on the ballot
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoterAnswers {
    #[serde(default)]
    pub question_answers: Vec<QuestionAnswer>,

    #[serde(default)]
    pub election_answers: Vec<ElectionAnswer>,
}

/// Answer to a referendum question. No answer means blank.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnswer {
    pub question_id: String,

    #[serde(default)]
    pub answer_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ElectionAnswer {
    pub election_id: String,

    /// Chosen list, if the election has lists
    #[serde(default)]
    pub list_id: Option<String>,

    /// One choice per candidate position, in position order
    #[serde(default)]
    pub candidates: Vec<CandidateChoice>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CandidateChoice {
    Candidate {
        #[serde(rename = "candidateId")]
        candidate_id: String,
    },
    WriteIn {
        text: String,
    },
    Empty,
}

/// Protocol-level form of [`VoterAnswers`]
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedAnswers {
    pub selected_actual_voting_options: Vec<String>,
    pub selected_write_ins: Vec<String>,
}

fn option(table: &PrimesMappingTable, actual_voting_option: String) -> Result<String, Error> {
    if table.contains_actual(&actual_voting_option) {
        Ok(actual_voting_option)
    } else {
        Err(Error::invalid(format!(
            "{} is not a voting option of this ballot",
            actual_voting_option
        )))
    }
}

fn blank_answer(table: &PrimesMappingTable, question_id: &str) -> Result<String, Error> {
    table
        .entries()
        .find(|e| e.correctness_information == question_id && e.is_blank())
        .map(|e| e.actual_voting_option.clone())
        .ok_or_else(|| Error::invalid(format!("question {} has no blank answer", question_id)))
}

/// Map the voter's answers to actual voting options, validated against `table`
///
/// Write-in texts are returned in ballot order, next to the write-in position
/// they occupy.
pub fn translate_voter_answers(
    table: &PrimesMappingTable,
    answers: &VoterAnswers,
) -> Result<TranslatedAnswers, Error> {
    let mut translated = TranslatedAnswers::default();

    for question in answers.question_answers.iter() {
        let actual = match &question.answer_id {
            Some(answer_id) => option(table, format!("{}|{}", question.question_id, answer_id))?,
            None => blank_answer(table, &question.question_id)?,
        };
        translated.selected_actual_voting_options.push(actual);
    }

    for election in answers.election_answers.iter() {
        let eid = &election.election_id;

        match &election.list_id {
            Some(list_id) => {
                let actual = option(table, format!("{}|{}", eid, list_id))?;
                translated.selected_actual_voting_options.push(actual);
            }
            None => {
                let empty_list = format!("{}|{}", eid, EMPTY_LIST);
                if table.contains_actual(&empty_list) {
                    translated.selected_actual_voting_options.push(empty_list);
                }
            }
        }

        for (i, choice) in election.candidates.iter().enumerate() {
            let position = i + 1;
            let actual = match choice {
                CandidateChoice::Candidate { candidate_id } => {
                    format!("{}|{}", eid, candidate_id)
                }
                CandidateChoice::Empty => {
                    format!("{}|{}-{}", eid, EMPTY_CANDIDATE_POSITION, position)
                }
                CandidateChoice::WriteIn { text } => {
                    validate_write_in(text)?;
                    translated.selected_write_ins.push(text.clone());
                    format!("{}|{}-{}", eid, WRITE_IN_POSITION, position)
                }
            };
            translated
                .selected_actual_voting_options
                .push(option(table, actual)?);
        }
    }

    Ok(translated)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn sample_answers() -> VoterAnswers {
        VoterAnswers {
            question_answers: vec![QuestionAnswer {
                question_id: "q1".to_owned(),
                answer_id: Some("yes".to_owned()),
            }],
            election_answers: vec![ElectionAnswer {
                election_id: "e1".to_owned(),
                list_id: Some("l1".to_owned()),
                candidates: vec![
                    CandidateChoice::Candidate {
                        candidate_id: "c3".to_owned(),
                    },
                    CandidateChoice::WriteIn {
                        text: "Jane Doe".to_owned(),
                    },
                ],
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::fixtures::sample_answers;
    use crate::primes_mapping_table::fixtures::sample_table;

    #[test]
    fn translation() {
        let table = sample_table();
        let translated = translate_voter_answers(&table, &sample_answers()).unwrap();

        assert_eq!(
            translated.selected_actual_voting_options,
            vec!["q1|yes", "e1|l1", "e1|c3", "e1|WRITE_IN_POSITION-2"]
        );
        assert_eq!(translated.selected_write_ins, vec!["Jane Doe"]);
        assert!(is_valid_ballot(&table, &translated.selected_actual_voting_options).unwrap());
    }

    #[test]
    fn blank_ballot() {
        let table = sample_table();
        let answers = VoterAnswers {
            question_answers: vec![QuestionAnswer {
                question_id: "q1".to_owned(),
                answer_id: None,
            }],
            election_answers: vec![ElectionAnswer {
                election_id: "e1".to_owned(),
                list_id: None,
                candidates: vec![CandidateChoice::Empty, CandidateChoice::Empty],
            }],
        };

        let translated = translate_voter_answers(&table, &answers).unwrap();
        assert_eq!(
            translated.selected_actual_voting_options,
            vec![
                "q1|blank",
                "e1|EMPTY_LIST",
                "e1|EMPTY_CANDIDATE_POSITION-1",
                "e1|EMPTY_CANDIDATE_POSITION-2"
            ]
        );
        assert!(translated.selected_write_ins.is_empty());
    }

    #[test]
    fn unknown_options_are_rejected() {
        let table = sample_table();

        let mut answers = sample_answers();
        answers.question_answers[0].answer_id = Some("maybe".to_owned());
        assert!(translate_voter_answers(&table, &answers).is_err());

        let mut answers = sample_answers();
        answers.question_answers[0].question_id = "q2".to_owned();
        answers.question_answers[0].answer_id = None;
        assert!(translate_voter_answers(&table, &answers).is_err());

        // No third candidate position
        let mut answers = sample_answers();
        answers.election_answers[0]
            .candidates
            .push(CandidateChoice::Empty);
        assert!(translate_voter_answers(&table, &answers).is_err());
    }

    #[test]
    fn write_in_texts_are_voter_input() {
        let table = sample_table();

        for text in ["Jane €", "#Jane", " ", ""].iter() {
            let mut answers = sample_answers();
            answers.election_answers[0].candidates[1] = CandidateChoice::WriteIn {
                text: text.to_string(),
            };
            match translate_voter_answers(&table, &answers) {
                Err(Error::Validation(e)) => assert_eq!(e.error_status(), "WRITE_IN_INVALID"),
                other => panic!("{:?} accepted: {:?}", text, other),
            }
        }
    }

    #[test]
    fn answers_json() {
        let json = r#"{
            "questionAnswers": [{"questionId": "q1", "answerId": "yes"}],
            "electionAnswers": [{
                "electionId": "e1",
                "listId": "l1",
                "candidates": [
                    {"type": "candidate", "candidateId": "c3"},
                    {"type": "writeIn", "text": "Jane Doe"}
                ]
            }]
        }"#;
        let answers: VoterAnswers = serde_json::from_str(json).unwrap();
        assert_eq!(answers, sample_answers());
    }
}
