//! Exception operators: merging the main and secondary verdicts.

use roster_core::Facts;

use crate::error::{ConfigError, EvalError};
use crate::schema::{BlockDefinition, ExceptionOperator};

/// Merge the two clause verdicts.
///
/// For the limit operators `secondary` is the outcome of the bound check
/// (see [`limit_holds`]), not of the secondary clause.
pub fn combine(main: bool, secondary: bool, operator: ExceptionOperator) -> bool {
    match operator {
        ExceptionOperator::None => main,
        ExceptionOperator::And => main && secondary,
        ExceptionOperator::Or => main || secondary,
        ExceptionOperator::But => !main && secondary,
        ExceptionOperator::Except => main && !secondary,
        ExceptionOperator::LimitMax => main && secondary,
        ExceptionOperator::LimitMin => main && secondary,
    }
}

/// Bound check of a limit exception: `limit_value <= max` or `>= min`.
///
/// `None` for operators that are not limits.
pub(crate) fn limit_holds(
    exception: &BlockDefinition,
    operator: ExceptionOperator,
    facts: &Facts,
) -> Result<Option<bool>, EvalError> {
    let details = exception.exception_details()?;
    let missing = |field| ConfigError::MissingDetail {
        id: exception.id.clone(),
        field,
    };

    let holds = match operator {
        ExceptionOperator::LimitMax => {
            let max = details.max.ok_or_else(|| missing("max"))?;
            facts.require_limit_value()? <= max
        }
        ExceptionOperator::LimitMin => {
            let min = details.min.ok_or_else(|| missing("min"))?;
            facts.require_limit_value()? >= min
        }
        _ => return Ok(None),
    };
    Ok(Some(holds))
}
