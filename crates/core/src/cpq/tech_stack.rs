use serde::{Deserialize, Serialize};

use crate::domain::normalize_name;
use crate::domain::seniority::Seniority;

/// Workload family a suggested role serves; each family has its own allocation score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffingDomain {
    Data,
    Vis,
    Sci,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoleSuggestion {
    pub role: &'static str,
    pub seniority: Seniority,
    pub rationale: &'static str,
    /// Untagged suggestions are informational only and never auto-staffed.
    pub domain: Option<StaffingDomain>,
}

const fn suggest(
    role: &'static str,
    seniority: Seniority,
    rationale: &'static str,
    domain: Option<StaffingDomain>,
) -> RoleSuggestion {
    RoleSuggestion { role, seniority, rationale, domain }
}

use Seniority::{Expert, Jr, Med, Sr};
use StaffingDomain::{Data, Sci, Vis};

const AIRFLOW: &[RoleSuggestion] =
    &[suggest("data_engineer", Sr, "DAG orchestration and scheduler upkeep", Some(Data))];
const AZURE_DATA_FACTORY: &[RoleSuggestion] =
    &[suggest("data_engineer", Med, "Managed ingestion pipelines and linked services", Some(Data))];
const AWS_GLUE: &[RoleSuggestion] =
    &[suggest("data_engineer", Med, "Glue jobs, crawlers and catalog maintenance", Some(Data))];
const DATABRICKS: &[RoleSuggestion] = &[
    suggest("data_engineer", Sr, "Lakehouse jobs and cluster policies", Some(Data)),
    suggest("data_scientist", Med, "Notebook-based model iteration", Some(Sci)),
];
const SPARK: &[RoleSuggestion] =
    &[suggest("data_engineer", Sr, "Distributed job tuning", Some(Data))];
const SNOWFLAKE: &[RoleSuggestion] = &[
    suggest("data_engineer", Med, "Warehouse loading and cost controls", Some(Data)),
    suggest("analytics_engineer", Med, "Modelled marts on the warehouse", Some(Data)),
];
const BIGQUERY: &[RoleSuggestion] =
    &[suggest("data_engineer", Med, "Dataset partitioning and scheduled queries", Some(Data))];
const DBT: &[RoleSuggestion] =
    &[suggest("analytics_engineer", Med, "dbt models, tests and docs", Some(Data))];
const KAFKA: &[RoleSuggestion] =
    &[suggest("data_engineer", Expert, "Streaming topology and consumer lag", Some(Data))];
const POWER_BI: &[RoleSuggestion] =
    &[suggest("bi_developer", Med, "Report authoring and dataset refreshes", Some(Vis))];
const TABLEAU: &[RoleSuggestion] =
    &[suggest("bi_developer", Med, "Workbook maintenance and extracts", Some(Vis))];
const LOOKER: &[RoleSuggestion] =
    &[suggest("bi_developer", Sr, "LookML modelling and explores", Some(Vis))];
const PYTHON: &[RoleSuggestion] =
    &[suggest("data_scientist", Med, "Analytical scripts and notebooks", Some(Sci))];
const SAGEMAKER: &[RoleSuggestion] =
    &[suggest("ml_engineer", Sr, "Endpoint hosting and retraining jobs", Some(Sci))];
const AZURE_ML: &[RoleSuggestion] =
    &[suggest("ml_engineer", Sr, "Workspace pipelines and model registry", Some(Sci))];
const MLFLOW: &[RoleSuggestion] =
    &[suggest("ml_engineer", Med, "Experiment tracking and model promotion", Some(Sci))];
const EXCEL: &[RoleSuggestion] =
    &[suggest("support_analyst", Jr, "Spreadsheet hand-offs reviewed case by case", None)];
const JIRA: &[RoleSuggestion] =
    &[suggest("project_manager", Med, "Backlog coordination", None)];

/// Role suggestions for a technology id; unknown technologies suggest nothing.
pub fn suggestions_for(technology: &str) -> &'static [RoleSuggestion] {
    match normalize_name(technology).replace('-', "_").as_str() {
        "airflow" => AIRFLOW,
        "azure_data_factory" | "adf" => AZURE_DATA_FACTORY,
        "aws_glue" | "glue" => AWS_GLUE,
        "databricks" => DATABRICKS,
        "spark" | "pyspark" => SPARK,
        "snowflake" => SNOWFLAKE,
        "bigquery" => BIGQUERY,
        "dbt" => DBT,
        "kafka" => KAFKA,
        "power_bi" | "powerbi" => POWER_BI,
        "tableau" => TABLEAU,
        "looker" => LOOKER,
        "python" => PYTHON,
        "sagemaker" => SAGEMAKER,
        "azure_ml" => AZURE_ML,
        "mlflow" => MLFLOW,
        "excel" => EXCEL,
        "jira" => JIRA,
        _ => &[],
    }
}
