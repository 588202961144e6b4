//! Template catalog - built-in administration commands
//!
//! Templates are parametric commands for routine SUSE/HANA administration:
//! filesystem inspection, log search, service and database checks. Every
//! built-in template must lint clean (see `lint`).

use crate::template::{DangerLevel, InputSpec, TemplateDefinition};
use crate::validator::Validator;
use std::collections::HashMap;

/// Ordered collection of templates with id lookup
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    templates: Vec<TemplateDefinition>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with all built-in templates
    pub fn builtin() -> Self {
        let mut catalog = Self::new();

        // Filesystem
        catalog.register(Self::directory_size());
        catalog.register(Self::find_files());
        catalog.register(Self::largest_files());
        catalog.register(Self::disk_overview());

        // Logs
        catalog.register(Self::log_search());
        catalog.register(Self::log_analyzer());
        catalog.register(Self::service_logs());

        // System
        catalog.register(Self::service_status());
        catalog.register(Self::process_monitor());
        catalog.register(Self::automated_health_check());

        // Network
        catalog.register(Self::network_connections());
        catalog.register(Self::ping_host());

        // HANA
        catalog.register(Self::hana_processes());
        catalog.register(Self::hana_trace());
        catalog.register(Self::hana_backup_status());
        catalog.register(Self::sapcontrol_status());
        catalog.register(Self::system_replication());

        // Database
        catalog.register(Self::connection_count());

        // Security
        catalog.register(Self::file_permissions_audit());

        // Maintenance
        catalog.register(Self::log_rotation_check());
        catalog.register(Self::duplicate_files());

        // Monitoring
        catalog.register(Self::system_resource_monitor());
        catalog.register(Self::container_monitor());

        catalog
    }

    /// Add a template; a template with the same id is replaced in place
    pub fn register(&mut self, template: TemplateDefinition) {
        match self.index.get(&template.id) {
            Some(&pos) => self.templates[pos] = template,
            None => {
                self.index.insert(template.id.clone(), self.templates.len());
                self.templates.push(template);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&TemplateDefinition> {
        self.index.get(id).map(|&pos| &self.templates[pos])
    }

    /// All templates in registration order
    pub fn list(&self) -> &[TemplateDefinition] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Distinct categories in first-appearance order
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for template in &self.templates {
            if !categories.contains(&template.category.as_str()) {
                categories.push(&template.category);
            }
        }
        categories
    }

    pub fn by_category(&self, category: &str) -> Vec<&TemplateDefinition> {
        self.templates
            .iter()
            .filter(|t| t.category == category)
            .collect()
    }

    /// Case-insensitive search over id, name and description
    pub fn search(&self, query: &str) -> Vec<&TemplateDefinition> {
        let query_lower = query.to_lowercase();
        self.templates
            .iter()
            .filter(|t| {
                t.id.to_lowercase().contains(&query_lower)
                    || t.name.to_lowercase().contains(&query_lower)
                    || t.description.to_lowercase().contains(&query_lower)
            })
            .collect()
    }

    // ===== SHARED INPUTS =====

    fn sid_input() -> InputSpec {
        InputSpec::text("sid", "System ID (SID)")
            .required()
            .placeholder("HDB")
            .help("Three letter SAP system id")
            .validator(Validator::regex(
                "^[A-Z]{3}$",
                "SID must be exactly 3 uppercase letters",
            ))
    }

    fn instance_number_input() -> InputSpec {
        InputSpec::text("instanceNumber", "Instance Number")
            .default_value("00")
            .placeholder("00")
            .validator(Validator::regex(
                "^[0-9]{2}$",
                "Instance number must be exactly 2 digits",
            ))
    }

    // ===== BUILT-IN TEMPLATE DEFINITIONS =====

    fn directory_size() -> TemplateDefinition {
        TemplateDefinition::new(
            "directory-size",
            "Directory Size Analysis",
            "filesystem",
            "du -hca {directory} | sort -h",
        )
        .description("List sizes of directories and files, sorted by size")
        .input(
            InputSpec::text("directory", "Directory Path")
                .required()
                .default_value("/")
                .placeholder("/hana/shared")
                .help("Absolute path to the directory you want to analyze")
                .validator(Validator::Path),
        )
        .example("du -hca '/hana/shared' | sort -h")
        .note("This command may take time on large directories")
        .note("Results are sorted from smallest to largest")
    }

    fn find_files() -> TemplateDefinition {
        TemplateDefinition::new(
            "find-files",
            "Find Files by Pattern",
            "filesystem",
            "find {startPath} -type f -name {pattern} 2>/dev/null",
        )
        .description("Search for files matching a specific pattern")
        .input(
            InputSpec::text("startPath", "Starting Path")
                .required()
                .default_value("/")
                .help("Directory to start the search from")
                .validator(Validator::Path),
        )
        .input(
            InputSpec::text("pattern", "File Pattern")
                .required()
                .placeholder("bck_*")
                .help("Use wildcards like * and ? to match file names")
                .validator(Validator::Pattern),
        )
        .example("find '/' -type f -name 'bck_*' 2>/dev/null")
        .note("Errors are suppressed with 2>/dev/null")
    }

    fn largest_files() -> TemplateDefinition {
        TemplateDefinition::new(
            "largest-files",
            "Largest Files in Directory",
            "filesystem",
            "find {directory} -type f -printf '%s %p\\n' | sort -nr | head -n {count} | numfmt --field=1 --to=iec",
        )
        .description("Find the largest files in a directory")
        .input(
            InputSpec::text("directory", "Directory Path")
                .required()
                .default_value("/var/log")
                .validator(Validator::Path),
        )
        .input(
            InputSpec::text("count", "Number of Files")
                .required()
                .default_value("10")
                .help("How many of the largest files to show")
                .validator(Validator::number_range(1, 100)),
        )
        .note("Sorted from largest to smallest")
    }

    fn disk_overview() -> TemplateDefinition {
        TemplateDefinition::new(
            "disk-overview",
            "Disk Usage Overview",
            "filesystem",
            "df -h && echo '--- Block Devices ---' && lsblk",
        )
        .description("Show disk usage and mount points")
        .note("Shows both filesystem usage and block device information")
    }

    fn log_search() -> TemplateDefinition {
        TemplateDefinition::new(
            "log-search",
            "Log File Search",
            "logs",
            "grep -R{caseSensitive|no:i}n -- {keyword} {logDir} 2>/dev/null",
        )
        .description("Search for keywords in log files")
        .input(
            InputSpec::text("keyword", "Search Keyword")
                .required()
                .placeholder("ERROR")
                .validator(Validator::Keyword),
        )
        .input(
            InputSpec::text("logDir", "Log Directory")
                .required()
                .default_value("/var/log")
                .validator(Validator::Path),
        )
        .input(
            InputSpec::select("caseSensitive", "Case Sensitive", &["no", "yes"])
                .default_value("no")
                .help("Whether the search should be case sensitive"),
        )
        .example("grep -Rin -- 'ERROR' '/var/log' 2>/dev/null")
        .note("Case insensitive by default")
    }

    fn log_analyzer() -> TemplateDefinition {
        TemplateDefinition::new(
            "log-analyzer",
            "Advanced Log Analyzer",
            "logs",
            "{analysisType|errors:grep -in -e error -e fatal -e critical|warnings:grep -in -e warn|timeline:grep -n -e error -e warn} -- {logFile} | tail -n {lines}",
        )
        .description("Extract errors, warnings or a combined timeline from a log file")
        .input(
            InputSpec::text("logFile", "Log File Path")
                .required()
                .placeholder("/var/log/messages")
                .validator(Validator::Path),
        )
        .input(
            InputSpec::select("analysisType", "Analysis Type", &["errors", "warnings", "timeline"])
                .default_value("errors"),
        )
        .input(
            InputSpec::text("lines", "Lines to Show")
                .default_value("100")
                .validator(Validator::number_range(1, 10000)),
        )
    }

    fn service_logs() -> TemplateDefinition {
        TemplateDefinition::new(
            "service-logs",
            "Service Journal",
            "logs",
            "journalctl -u {serviceName} --since {since|1h:'1 hour ago'|24h:'24 hours ago'|7d:'7 days ago'} --no-pager -n {lines}",
        )
        .description("Show recent journal entries for a systemd unit")
        .input(
            InputSpec::text("serviceName", "Service Name")
                .required()
                .placeholder("sapinit")
                .validator(Validator::Identifier),
        )
        .input(InputSpec::select("since", "Time Window", &["1h", "24h", "7d"]).default_value("24h"))
        .input(
            InputSpec::text("lines", "Max Lines")
                .default_value("200")
                .validator(Validator::number_range(1, 5000)),
        )
    }

    fn service_status() -> TemplateDefinition {
        TemplateDefinition::new(
            "service-status",
            "Service Status Check",
            "system",
            "systemctl status {serviceName}",
        )
        .description("Check the status of system services")
        .input(
            InputSpec::text("serviceName", "Service Name")
                .required()
                .placeholder("sshd")
                .validator(Validator::Identifier),
        )
        .example("systemctl status 'sshd'")
    }

    fn process_monitor() -> TemplateDefinition {
        TemplateDefinition::new(
            "process-monitor",
            "Process Monitor",
            "system",
            "ps aux --sort=-{sortBy|cpu:%cpu|memory:%mem|pid:pid|time:time} | grep -E -- {processFilter|:.|{processFilter}} | head -n 25",
        )
        .description("Show top processes, optionally filtered by name")
        .input(
            InputSpec::text("processFilter", "Process Filter")
                .placeholder("hdb")
                .help("Leave empty to show all processes")
                .validator(Validator::Keyword),
        )
        .input(
            InputSpec::select("sortBy", "Sort By", &["cpu", "memory", "pid", "time"])
                .default_value("cpu"),
        )
    }

    fn automated_health_check() -> TemplateDefinition {
        TemplateDefinition::new(
            "automated-health-check",
            "Automated Health Check",
            "automation",
            "uptime && free -h && df -h{checkLevel|detailed: && systemctl --failed --no-pager && journalctl -p err -b --no-pager -n 50}",
        )
        .description("Quick system health summary")
        .input(
            InputSpec::select("checkLevel", "Check Level", &["basic", "detailed"])
                .default_value("basic"),
        )
    }

    fn network_connections() -> TemplateDefinition {
        TemplateDefinition::new(
            "network-connections",
            "Network Connections",
            "network",
            "ss -{protocol|tcp:t|udp:u|all:tu}{connectionType|listening:l|established:|all:a}np{connectionType|established: state established}",
        )
        .description("List sockets by protocol and state")
        .input(
            InputSpec::select("connectionType", "Connection Type", &["all", "listening", "established"])
                .default_value("all"),
        )
        .input(InputSpec::select("protocol", "Protocol", &["all", "tcp", "udp"]).default_value("all"))
        .example("ss -tuanp")
        .example("ss -tlnp")
    }

    fn ping_host() -> TemplateDefinition {
        TemplateDefinition::new(
            "ping-host",
            "Connectivity Test",
            "network",
            "ping -c {count} -W 2 {host}",
        )
        .description("Check reachability of a host")
        .input(
            InputSpec::text("host", "Host")
                .required()
                .placeholder("google.com")
                .validator(Validator::regex(
                    "^[A-Za-z0-9][A-Za-z0-9.-]*$",
                    "Host must be a hostname or IPv4 address",
                )),
        )
        .input(
            InputSpec::text("count", "Packets")
                .default_value("4")
                .validator(Validator::number_range(1, 100)),
        )
    }

    fn hana_processes() -> TemplateDefinition {
        TemplateDefinition::new(
            "hana-processes",
            "HANA Process Check",
            "hana",
            "ps -ef | grep -E '[h]db(nameserver|indexserver|daemon|xsengine)'",
        )
        .description("List running HANA server processes")
    }

    fn hana_trace() -> TemplateDefinition {
        TemplateDefinition::new(
            "hana-trace",
            "HANA Trace Files",
            "hana",
            "tail -f /usr/sap/{sid}/HDB{instanceNumber}/*/trace/*.trc",
        )
        .description("Follow HANA trace files of an instance")
        .danger(DangerLevel::Caution)
        .input(Self::sid_input())
        .input(Self::instance_number_input())
        .note("Runs until interrupted with Ctrl+C")
    }

    fn hana_backup_status() -> TemplateDefinition {
        TemplateDefinition::new(
            "hana-backup-status",
            "HANA Backup Status",
            "hana",
            "hdbsql -i {instanceNumber} -d SYSTEMDB -u SYSTEM \"SELECT TOP 20 ENTRY_TYPE_NAME, STATE_NAME, SYS_START_TIME FROM M_BACKUP_CATALOG{backupType|data: WHERE ENTRY_TYPE_NAME LIKE '%data%'|log: WHERE ENTRY_TYPE_NAME = 'log backup'} ORDER BY SYS_START_TIME DESC\"",
        )
        .description("Show the most recent entries of the backup catalog")
        .input(Self::instance_number_input())
        .input(InputSpec::select("backupType", "Backup Type", &["all", "data", "log"]).default_value("all"))
        .note("Prompts for the SYSTEM user password")
    }

    fn sapcontrol_status() -> TemplateDefinition {
        TemplateDefinition::new(
            "sapcontrol-status",
            "SAP Control Status",
            "hana",
            "sapcontrol -nr {instanceNumber} -function {function|processes:GetProcessList|instances:GetSystemInstanceList|version:GetVersionInfo}",
        )
        .description("Query sapstartsrv for process or instance state")
        .input(Self::instance_number_input())
        .input(
            InputSpec::select("function", "Query", &["processes", "instances", "version"])
                .default_value("processes"),
        )
    }

    fn system_replication() -> TemplateDefinition {
        TemplateDefinition::new(
            "system-replication",
            "System Replication Status",
            "hana",
            "su - {sidadm} -c {checkType|replication_status:'HDBSettings.sh systemReplicationStatus.py'|site_info:'hdbnsutil -sr_state'}",
        )
        .description("Check HANA system replication from the <sid>adm user")
        .danger(DangerLevel::Caution)
        .input(
            InputSpec::text("sidadm", "SID Admin User")
                .required()
                .placeholder("hdbadm")
                .validator(Validator::regex(
                    "^[a-z][a-z0-9]{2}adm$",
                    "Must be the <sid>adm user in lowercase, e.g. hdbadm",
                )),
        )
        .input(
            InputSpec::select("checkType", "Check Type", &["replication_status", "site_info"])
                .default_value("replication_status"),
        )
    }

    fn connection_count() -> TemplateDefinition {
        TemplateDefinition::new(
            "connection-count",
            "Database Connection Count",
            "database",
            "{dbType|hana:hdbsql -i {instanceNumber} -d SYSTEMDB -u SYSTEM|postgresql:psql -U postgres -c|mysql:mysql -u root -e} \"SELECT COUNT(*) FROM {dbType|hana:M_CONNECTIONS|postgresql:pg_stat_activity|mysql:information_schema.PROCESSLIST}\"",
        )
        .description("Count open connections on HANA, PostgreSQL or MySQL")
        .input(
            InputSpec::select("dbType", "Database Type", &["hana", "postgresql", "mysql"])
                .default_value("hana"),
        )
        .input(Self::instance_number_input().help("Only used for HANA"))
    }

    fn file_permissions_audit() -> TemplateDefinition {
        TemplateDefinition::new(
            "file-permissions-audit",
            "File Permissions Audit",
            "security",
            "find {searchPath} -type f {permissionType|world-writable:-perm -002|setuid:-perm -4000|setgid:-perm -2000|no-owner:\\( -nouser -o -nogroup \\)|executable:-perm -111} 2>/dev/null | head -20",
        )
        .description("Find files with specific permissions or ownership issues")
        .input(
            InputSpec::text("searchPath", "Search Path")
                .required()
                .default_value("/usr/sap")
                .validator(Validator::Path),
        )
        .input(
            InputSpec::select(
                "permissionType",
                "Permission Type",
                &["world-writable", "setuid", "setgid", "no-owner", "executable"],
            )
            .default_value("world-writable"),
        )
        .note("Limited to 20 results")
        .note("May require elevated privileges for some directories")
    }

    fn log_rotation_check() -> TemplateDefinition {
        TemplateDefinition::new(
            "log-rotation-check",
            "Log Rotation Status",
            "maintenance",
            "ls -la {logPath}/*.log* 2>/dev/null | head -10 && echo '--- Logrotate Status ---' && logrotate -d /etc/logrotate.conf 2>&1 | grep -A5 -B5 -- {logPath}",
        )
        .description("Check log rotation configuration and status")
        .input(
            InputSpec::text("logPath", "Log Directory")
                .required()
                .default_value("/var/log")
                .validator(Validator::Path),
        )
        .note("logrotate runs in debug (dry-run) mode")
    }

    fn duplicate_files() -> TemplateDefinition {
        TemplateDefinition::new(
            "duplicate-files",
            "Find Duplicate Files",
            "maintenance",
            "find {searchPath} -type f -size +{minSize}M -exec md5sum {} + 2>/dev/null | sort | uniq -D -w32",
        )
        .description("Find duplicate files based on size and checksum")
        .danger(DangerLevel::Caution)
        .input(
            InputSpec::text("searchPath", "Search Path")
                .required()
                .default_value("/home")
                .validator(Validator::Path),
        )
        .input(
            InputSpec::text("minSize", "Minimum File Size (MB)")
                .default_value("10")
                .validator(Validator::number_range(1, 1000)),
        )
        .note("May take significant time on large directories")
    }

    fn system_resource_monitor() -> TemplateDefinition {
        TemplateDefinition::new(
            "system-resource-monitor",
            "System Resource Monitor",
            "monitoring",
            "timeout {duration} vmstat -w {interval}",
        )
        .description("Sample CPU, memory and IO activity for a while")
        .input(
            InputSpec::text("duration", "Monitor Duration (seconds)")
                .default_value("60")
                .validator(Validator::number_range(10, 3600)),
        )
        .input(
            InputSpec::text("interval", "Sample Interval (seconds)")
                .default_value("5")
                .validator(Validator::number_range(1, 60)),
        )
    }

    fn container_monitor() -> TemplateDefinition {
        TemplateDefinition::new(
            "container-monitor",
            "Container Monitor",
            "monitoring",
            "{runtime|docker:docker|podman:podman} ps -a{containerFilter|:| --filter name={containerFilter}}",
        )
        .description("List containers, optionally filtered by name")
        .input(
            InputSpec::select("runtime", "Runtime", &["docker", "podman"]).default_value("podman"),
        )
        .input(
            InputSpec::text("containerFilter", "Container Filter")
                .help("Leave empty to list all containers")
                .validator(Validator::Identifier),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let catalog = Catalog::builtin();
        let template = catalog.get("directory-size").unwrap();
        assert_eq!(template.template_text, "du -hca {directory} | sort -h");
        assert!(catalog.get("no-such-template").is_none());
    }

    #[test]
    fn test_registration_order_and_categories() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.list()[0].id, "directory-size");
        let categories = catalog.categories();
        assert_eq!(categories[0], "filesystem");
        assert_eq!(categories[1], "logs");
        let mut deduped = categories.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), categories.len());
    }

    #[test]
    fn test_register_replaces_same_id() {
        let mut catalog = Catalog::new();
        catalog.register(TemplateDefinition::new("a", "First", "x", "true"));
        catalog.register(TemplateDefinition::new("b", "Other", "x", "true"));
        catalog.register(TemplateDefinition::new("a", "Second", "x", "false"));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("a").unwrap().name, "Second");
        assert_eq!(catalog.list()[0].id, "a");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let catalog = Catalog::builtin();
        let ids: Vec<_> = catalog.search("HANA").iter().map(|t| t.id.as_str()).collect();
        assert!(ids.contains(&"hana-trace"));
        assert!(ids.contains(&"hana-processes"));
        assert!(catalog.search("zzz-nothing").is_empty());
    }

    #[test]
    fn test_by_category() {
        let catalog = Catalog::builtin();
        let hana = catalog.by_category("hana");
        assert!(hana.len() >= 3);
        assert!(hana.iter().all(|t| t.category == "hana"));
    }
}
