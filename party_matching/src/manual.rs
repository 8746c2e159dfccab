/*!

This is the long-form manual for `party_matching` and `electest`.

## Answers

A respondent gives one answer per question. Each answer has an opinion
(agree, disagree, undecided) and may be boosted to mark it as important.
The textual form uses one character per question:

| symbol | opinion   | boosted |
|--------|-----------|---------|
| `a`    | agree     | no      |
| `A`    | agree     | yes     |
| `d`    | disagree  | no      |
| `D`    | disagree  | yes     |
| `u`    | undecided | no      |
| `U`    | undecided | yes     |

For example `adaDddAaddu` answers 11 questions, with two boosted answers.

## Scoring

For every party `P`, over all the questions:

- `matches(P)`: the questions where the opinion of the respondent is the opinion of `P`.
  Boosts are ignored (parties never boost).
- `boosted_matches(P)`: among these, the questions that the respondent boosted.
- `weighted_sum(P)`: the sum of the weights of `P` over the matching questions.
- `total_boosted`: the number of boosted answers of the respondent, undecided included.

The percentage is then:

```text
(weighted_sum(P) + boosted_matches(P) / total_boosted * 20) / 1.2    if total_boosted > 0
weighted_sum(P)                                                       otherwise
```

The weights of a party usually sum to 100 over a questionnaire, so that the
percentage stays within 0 and 100.

When rounding is requested, values are rounded to the nearest integer and
exact halves go to the even integer (`62.5` becomes `62`).

Ranked results are sorted by decreasing percentage. Parties with the same
percentage are sorted by decreasing name (`PTB` before `PS`), which makes the
order complete and reproducible.

## Dataset

The questionnaire is a JSON array of questions:

```text
[
  {
    "id": 2081,
    "short": "Nuclear power",
    "statement": "Belgium should extend its nuclear plants.",
    "level": ["base"],
    "partyOpinions": [
      {"party": {"name": "PS"}, "opinion": "disagree", "weight": 3.44, "description": "..."},
      ...
    ]
  },
  ...
]
```

- `id` can be a number or a string.
- `level` lists the questionnaires the question belongs to (`base`, ...).
  A question is retained when one of its levels is requested.
- `partyOpinions` must hold exactly one entry per party of the roster of the
  language. The party of the first entry decides the language of a question:
  questions of the other language are skipped.
- `opinion` is `agree`, `disagree` or `undecided`.
- `description` is optional.

### Rosters

- `french`: Défi, Ecolo, Les Engagés, MR, PS, PTB
- `flemish`: CD&V, Groen, NVA, Open VLD, PVDA, Vlaams Belang, Vooruit

## Configuration

`electest` accepts an optional JSON configuration file with `--config`. All the
fields are optional and the command line options take precedence.

```text
{
  "database": "data/database.json",
  "levels": ["base"],
  "language": "french",
  "outputDirectory": "data",
  "simulation": {"seed": 543210, "trials": 10000, "changes": 2, "folds": 10}
}
```

## Simulations

- `stability`: for every party, answer exactly like the party, change `changes`
  answers at random (agree/disagree only, the boost may change) and record which
  party comes first. Repeated `trials` times per party.
- `random-winners`: draw random agree/disagree answers and count which party comes
  first, `trials` times per fold, for `folds` folds.

Both use a seeded generator: the same seed and dataset give the same tables.

 */
