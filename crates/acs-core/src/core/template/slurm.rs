use thiserror::Error;

/// Job-array script with `{name}` and `{last_job_num}` placeholders.
const G16_SLURM_ARRAY_SCRIPT: &str = r#"#!/bin/bash -l
#SBATCH -p normal
#SBATCH -J opt{name}
#SBATCH -N 1
#SBATCH -n 40
#SBATCH --time=5-0:00:00
#SBATCH --mem-per-cpu=9000
#SBATCH --array=0-{last_job_num}
#SBATCH --exclusive

export g16root=/home/gridsan/oscarwu/GRPAPI/Software
export PATH=$g16root/g16/:$g16root/gv:$PATH
echo "Gaussian PATH"
which g16

jnum=$SLURM_ARRAY_TASK_ID
fin=$(echo ${jnum}_*.gjf)
#fout="${fin%.*}".out

input=`basename $fin .gjf`
echo "============================================================"
echo "Job ID : $SLURM_JOB_ID"
echo "Job Name : $SLURM_JOB_NAME"
echo "task ID: $SLURM_ARRAY_TASK_ID"
echo "Starting on : $(date)"
echo "Running on node : $SLURMD_NODENAME"
echo "Current directory : $(pwd)"
echo "============================================================"

export GAUSS_SCRDIR=/home/gridsan/oscarwu/scratch/$SLURM_JOB_NAME-$SLURM_JOB_ID

export GAUSS_SCRDIR
. $g16root/g16/bsd/g16.profile

echo "GAUSS_SCRDIR : $GAUSS_SCRDIR"
mkdir -p $GAUSS_SCRDIR
chmod 750 $GAUSS_SCRDIR

g16 < $input.gjf > $input.log

rm -rf $GAUSS_SCRDIR



"#;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Last job number must be non-negative, got {0}")]
    NegativeJobNumber(i64),
    #[error("Job name must not be empty")]
    EmptyName,
    #[error("Job name '{0}' contains whitespace or control characters")]
    InvalidName(String),
}

/// Renders the Gaussian job-array submission script.
///
/// The array spans tasks `0..=last_job_num`, and the job is named `opt<name>`. The
/// output is the fixed script with only those two fields substituted; `name` is
/// inserted verbatim, so braces in it are never read as placeholders.
///
/// # Errors
///
/// Returns [`TemplateError`] if `last_job_num` is negative or `name` is empty or
/// contains whitespace or control characters, either of which would corrupt the
/// directive lines.
pub fn render(name: &str, last_job_num: i64) -> Result<String, TemplateError> {
    if last_job_num < 0 {
        return Err(TemplateError::NegativeJobNumber(last_job_num));
    }
    if name.is_empty() {
        return Err(TemplateError::EmptyName);
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(TemplateError::InvalidName(name.to_string()));
    }

    let last_job_num = last_job_num.to_string();
    Ok(G16_SLURM_ARRAY_SCRIPT
        .split("{name}")
        .map(|part| part.replace("{last_job_num}", &last_job_num))
        .collect::<Vec<_>>()
        .join(name))
}

/// File-name prefix of the input run by array task `index` (`<index>_*.gjf`).
pub fn array_input_prefix(index: usize) -> String {
    format!("{}_", index)
}

/// Last array index needed to run `input_count` inputs, or `None` for no inputs.
pub fn last_job_num_for(input_count: usize) -> Option<i64> {
    input_count.checked_sub(1).map(|n| n as i64)
}
