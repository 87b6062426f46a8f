mod test_dashboard {
    use campus_energy::output::{FileOutput, SinkOutput};
    use campus_energy::report::format_kwh;
    use campus_energy::{run_dashboard, BuildingManager};
    use chrono::{NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn write_file(directory: &Path, name: &str, content: &str) {
        fs::write(directory.join(name), content).unwrap();
    }

    #[fixture]
    fn input_dir() -> TempDir {
        let directory = TempDir::new().unwrap();
        write_file(
            directory.path(),
            "A.csv",
            "timestamp,kwh\n2024-01-01 00:00:00,10\n2024-01-01 01:00:00,20\n",
        );
        write_file(
            directory.path(),
            "B.csv",
            "timestamp,kwh\n2024-01-01 00:00:00,5\n",
        );
        directory
    }

    fn read_output(output: &FileOutput, file_name: &str) -> String {
        fs::read_to_string(output.directory_path().join(file_name)).unwrap()
    }

    #[rstest]
    fn test_run_dashboard_writes_all_reports(input_dir: TempDir) {
        let output_root = TempDir::new().unwrap();
        let output = FileOutput::create(output_root.path().join("output")).unwrap();
        let mut manager = BuildingManager::new();

        let run = run_dashboard(input_dir.path(), &output, &mut manager, generated_at()).unwrap();

        assert_eq!(run.files_found, 2);
        assert_eq!(run.invalid_timestamps, 0);
        assert_eq!(run.malformed_rows, 0);
        assert_eq!(run.rejected_readings, 0);
        assert_eq!(run.summary.buildings_analyzed, 2);
        assert_eq!(run.summary.records_processed, 3);
        assert_eq!(manager.get("A").unwrap().total_consumption(), 30.);
        assert_eq!(manager.get("B").unwrap().total_consumption(), 5.);

        assert_eq!(
            read_output(&output, "cleaned_energy_data.csv"),
            "timestamp,kwh,Building_Name\n\
             2024-01-01 00:00:00,10,A\n\
             2024-01-01 01:00:00,20,A\n\
             2024-01-01 00:00:00,5,B\n"
        );
        assert_eq!(
            read_output(&output, "building_summary.csv"),
            "Building,Total (kwh),Mean (kwh),Max (kwh),Min (kwh)\n\
             A,30.0,15.0,20.0,10.0\n\
             B,5.0,5.0,5.0,5.0\n"
        );
        assert_eq!(
            read_output(&output, "daily_totals.csv"),
            "Building,Date,Total (kwh)\nA,2024-01-01,30.0\nB,2024-01-01,5.0\n"
        );
        assert_eq!(
            read_output(&output, "weekly_averages.csv"),
            "Building,Week Ending,Mean (kwh)\nA,2024-01-07,15.0\nB,2024-01-07,5.0\n"
        );

        let report = read_output(&output, "summary.txt");
        assert!(report.starts_with("\nCAMPUS ENERGY ANALYSIS REPORT\n"));
        assert!(report.contains("Date Generated: 2024-01-02 09:30:00\n"));
        assert!(report.contains("Total Campus Consumption: 35.00 kwh\n"));
        assert!(report.contains("Peak Campus Load: 20.00 kwh occurred at 2024-01-01 01:00:00\n"));
        assert!(report.contains("Highest Consuming Building: A\n"));
        assert!(report.contains("Total Buildings Analyzed: 2\nData Records Processed: 3\n"));
    }

    #[rstest]
    fn test_file_without_kwh_column_is_skipped(input_dir: TempDir) {
        write_file(
            input_dir.path(),
            "C.csv",
            "timestamp,reading\n2024-01-01 00:00:00,99\n",
        );
        let mut manager = BuildingManager::new();

        let run = run_dashboard(input_dir.path(), SinkOutput, &mut manager, generated_at()).unwrap();

        assert_eq!(run.files_found, 3);
        assert_eq!(run.summary.records_processed, 3);
        assert!(manager.get("C").is_none());
        assert_eq!(
            manager
                .list_buildings()
                .map(|building| building.name())
                .collect::<Vec<_>>(),
            vec!["A", "B"]
        );
    }

    #[rstest]
    fn test_unreadable_file_does_not_affect_other_files(input_dir: TempDir) {
        let mut bytes = b"timestamp,kwh\n2024-01-01 00:00:00,".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        fs::write(input_dir.path().join("X.csv"), bytes).unwrap();
        let mut manager = BuildingManager::new();

        let run = run_dashboard(input_dir.path(), SinkOutput, &mut manager, generated_at()).unwrap();

        assert_eq!(run.files_found, 3);
        assert_eq!(run.summary.records_processed, 3);
        assert!(manager.get("X").is_none());
        assert_eq!(manager.get("A").unwrap().total_consumption(), 30.);
        assert_eq!(manager.get("B").unwrap().total_consumption(), 5.);
    }

    #[rstest]
    fn test_malformed_rows_are_skipped_and_counted(input_dir: TempDir) {
        write_file(
            input_dir.path(),
            "Lab.csv",
            "timestamp,kwh\n\
             2024-01-01 00:00:00,1,extra\n\
             2024-01-01 01:00:00,2\n",
        );
        let mut manager = BuildingManager::new();

        let run = run_dashboard(input_dir.path(), SinkOutput, &mut manager, generated_at()).unwrap();

        assert_eq!(run.malformed_rows, 1);
        assert_eq!(run.summary.records_processed, 4);
        assert_eq!(manager.get("Lab").unwrap().total_consumption(), 2.);
    }

    #[rstest]
    fn test_out_of_range_year_is_an_invalid_timestamp(input_dir: TempDir) {
        write_file(
            input_dir.path(),
            "Annex.csv",
            "timestamp,kwh\n+262142-12-31,1\n2024-01-01 02:00:00,3\n",
        );
        let output_root = TempDir::new().unwrap();
        let output = FileOutput::create(output_root.path()).unwrap();
        let mut manager = BuildingManager::new();

        let run = run_dashboard(input_dir.path(), &output, &mut manager, generated_at()).unwrap();

        assert_eq!(run.invalid_timestamps, 1);
        assert_eq!(manager.get("Annex").unwrap().total_consumption(), 3.);
        assert!(read_output(&output, "weekly_averages.csv").contains("Annex,2024-01-07,3.0\n"));
    }

    #[rstest]
    fn test_invalid_timestamps_are_dropped_and_counted() {
        let input_dir = TempDir::new().unwrap();
        write_file(
            input_dir.path(),
            "Hall.csv",
            "timestamp,kwh\n\
             2024-01-01 00:00:00,4\n\
             yesterday,7\n\
             2024-13-01 00:00:00,1\n\
             2024-01-01 02:00:00,6\n",
        );
        let mut manager = BuildingManager::new();

        let run = run_dashboard(input_dir.path(), SinkOutput, &mut manager, generated_at()).unwrap();

        assert_eq!(run.invalid_timestamps, 2);
        assert_eq!(run.summary.records_processed, 2);
        assert_eq!(manager.get("Hall").unwrap().total_consumption(), 10.);
    }

    #[rstest]
    fn test_unparseable_kwh_is_rejected_at_population(input_dir: TempDir) {
        write_file(
            input_dir.path(),
            "Gym.csv",
            "timestamp,kwh\n2024-01-01 00:00:00,lots\n2024-01-01 01:00:00,2.5\n",
        );
        let mut manager = BuildingManager::new();

        let run = run_dashboard(input_dir.path(), SinkOutput, &mut manager, generated_at()).unwrap();

        assert_eq!(run.rejected_readings, 1);
        assert_eq!(run.summary.records_processed, 5);
        assert_eq!(manager.get("Gym").unwrap().readings().len(), 1);
    }

    #[rstest]
    #[case::empty_directory(true)]
    #[case::missing_directory(false)]
    fn test_no_input_gives_placeholder_report(#[case] create_input: bool) {
        let root = TempDir::new().unwrap();
        let input_dir = root.path().join("data");
        if create_input {
            fs::create_dir(&input_dir).unwrap();
        }
        let output = FileOutput::create(root.path().join("output")).unwrap();
        let mut manager = BuildingManager::new();

        let run = run_dashboard(&input_dir, &output, &mut manager, generated_at()).unwrap();

        assert_eq!(run.files_found, 0);
        assert_eq!(run.summary.highlights, None);
        assert!(manager.is_empty());
        assert_eq!(read_output(&output, "cleaned_energy_data.csv"), "");
        assert_eq!(
            read_output(&output, "building_summary.csv"),
            "Building,Total (kwh),Mean (kwh),Max (kwh),Min (kwh)\n"
        );

        let report = read_output(&output, "summary.txt");
        assert!(report.contains("No building readings were available."));
        assert!(report.contains("Total Buildings Analyzed: 0\nData Records Processed: 0\n"));
    }

    #[rstest]
    fn test_non_csv_files_are_ignored(input_dir: TempDir) {
        write_file(input_dir.path(), "notes.txt", "timestamp,kwh\n2024-01-01,1000\n");
        let mut manager = BuildingManager::new();

        let run = run_dashboard(input_dir.path(), SinkOutput, &mut manager, generated_at()).unwrap();

        assert_eq!(run.files_found, 2);
        assert_eq!(
            format_kwh(run.summary.highlights.unwrap().total_consumption),
            "35.00"
        );
    }
}
